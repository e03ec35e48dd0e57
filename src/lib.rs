/// FlatTable - Dynamic Tabular-Data Engine
///
/// Turns arbitrarily nested JSON records into flat, user-configurable tables:
/// recursive flattening with array fan-out, reconciliation of fresh datasets
/// against saved column preferences, a live column-state model (visibility,
/// order, width, pinned columns), and text search over the raw JSON.

pub mod column_state;
pub mod error;
pub mod flatten;
pub mod prefs;
pub mod reconcile;
pub mod search;
pub mod session;
pub mod value;

pub use column_state::ColumnState;
pub use error::{Error, Result};
pub use flatten::{flatten, flatten_with_exceptions, ArrayException, ExceptionTable, FlatRow, FlattenResult};
pub use prefs::{decode, encode, extract_section_code, MemoryPreferenceStore, PreferenceKey, PreferenceStore};
pub use reconcile::{reconcile, ColumnConfig, DEFAULT_COLUMN_WIDTH, MIN_COLUMN_WIDTH};
pub use search::{path_is_ancestor_of_any, search, MatchKind, PathSegment, SearchResult};
pub use session::{normalize_records, RequestId, TableSession, SETTLE_DELAY};
pub use value::CellValue;
