/// Column Preferences Example
///
/// This example demonstrates:
/// - Driving a dataset session end to end
/// - Mutating column state (hide, resize, reorder, lock)
/// - Persisting preferences and reloading them for the same dataset

use flattable::{MemoryPreferenceStore, PreferenceKey, TableSession};
use serde_json::json;
use std::time::Instant;

fn main() {
    env_logger::init();

    println!("=== FlatTable Column Preferences Example ===\n");

    let payload = json!([
        {"ident": "NTM", "type": "VOR", "freq": 115.3, "remarks": ["on test"]},
        {"ident": "FFM", "type": "VOR", "freq": 114.2, "remarks": []}
    ]);

    let key = PreferenceKey::for_file("eaip.pdf", "eaip_ENR_4_1.json", "table")
        .expect("filename carries a section code");
    let mut store = MemoryPreferenceStore::new();

    // 1. First visit: no saved preferences, defaults apply.
    println!("1. First visit (defaults)...");
    let mut session = TableSession::new();
    let now = Instant::now();
    let id = session.begin_request("ENR_4_1", "table", now).unwrap();
    let blob = TableSession::load_preferences(&store, Some(&key));
    session.complete_request(id, &payload, blob.as_deref(), now);
    println!("   columns: {:?}\n", session.columns().unwrap().config().order);

    // 2. Customize the layout.
    println!("2. Customizing...");
    {
        let columns = session.columns_mut().unwrap();
        columns.toggle_visibility("remarks");
        columns.reorder("freq", "type");
        columns.lock("ident");
        columns.resize("ident", -50);
    }
    let config = session.columns().unwrap().config();
    println!("   order:   {:?}", config.order);
    println!("   locked:  {:?}", config.locked);
    println!("   offsets: {:?}\n", session.columns().unwrap().sticky_offsets());

    // 3. Persist.
    println!("3. Saving preferences...");
    session.save_preferences(&mut store, &key).unwrap();
    println!("   stored blob '{}'\n", key.blob_filename());

    // 4. A later session for the same dataset restores the layout.
    println!("4. Revisiting...");
    let mut session = TableSession::new();
    let now = Instant::now();
    let id = session.begin_request("ENR_4_1", "table", now).unwrap();
    let blob = TableSession::load_preferences(&store, Some(&key));
    session.complete_request(id, &payload, blob.as_deref(), now);

    let config = session.columns().unwrap().config();
    println!("   order:   {:?}", config.order);
    println!("   hidden:  remarks visible = {}", config.visibility["remarks"]);
    println!("   width:   ident = {}px", config.widths["ident"]);
}
