/// Basic Flattening Example
///
/// This example demonstrates:
/// - Normalizing a raw payload into records
/// - Flattening nested records with array fan-out
/// - Exporting the flat rows as CSV
/// - Searching the raw JSON

use flattable::{flatten, normalize_records, search, MatchKind};
use serde_json::json;

fn main() {
    env_logger::init();

    println!("=== FlatTable Basic Flattening Example ===\n");

    // 1. A raw payload as it would come back from the dataset fetch.
    let payload = json!({"results": [
        {
            "ident": "EDDF",
            "name": "Frankfurt Main",
            "position": {"lat": 50.033, "lon": 8.570},
            "runways": [
                {"designator": "07C", "length_m": 4000},
                {"designator": "18", "length_m": 4000}
            ]
        },
        {
            "ident": "EDDM",
            "name": "Munich",
            "position": {"lat": 48.353, "lon": 11.786},
            "runways": []
        }
    ]});

    // 2. Normalize and flatten.
    println!("1. Flattening...");
    let records = normalize_records(&payload);
    let result = flatten(&records);
    println!(
        "   {} records became {} rows with {} columns\n",
        records.len(),
        result.rows.len(),
        result.field_set().len()
    );

    // 3. Show the discovered columns.
    println!("2. Field order (discovery order):");
    for field in &result.field_order {
        println!("   - {}", field);
    }
    println!();

    // 4. Export as CSV.
    println!("3. CSV export:");
    for line in result.to_csv().lines() {
        println!("   {}", line);
    }
    println!();

    // 5. Search the raw JSON for a runway designator.
    println!("4. Searching raw JSON for '07c'...");
    for hit in search(&payload, "07c") {
        let kind = match hit.match_in {
            MatchKind::Key => "key",
            MatchKind::Value => "value",
        };
        println!("   {} match at {:?}", kind, hit.path);
    }
}
