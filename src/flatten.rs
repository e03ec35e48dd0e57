/// FlatTable Flattening Engine
///
/// Converts an array of (possibly deeply nested) JSON records into an ordered
/// list of flat rows plus the discovery-ordered list of field names.
///
/// # Algorithm
///
/// Depth-first, prefix-accumulating. For each record:
/// - scalars and nulls are written into a row accumulator under their dotted
///   path (`prefix.key`, bare `key` at the root), registering the path into
///   the field order the first time it is seen;
/// - nested objects merge in place (object nesting never fans out rows);
/// - arrays are deferred, then fanned out independently per array field,
///   never as a cross product. Object elements recurse on a copy of the
///   accumulator; scalar elements emit `{ ...accumulator, field: value }`
///   directly; an empty array still emits the accumulator once so rows are
///   never silently lost.
///
/// Flattening the same input twice produces identical rows and field order.
///
/// # Examples
///
/// ```
/// use flattable::flatten;
/// use serde_json::json;
///
/// let records = vec![json!({"id": 1, "tags": ["x", "y"]})];
/// let result = flatten(&records);
///
/// assert_eq!(result.rows.len(), 2);
/// assert_eq!(result.field_order, vec!["id", "tags"]);
/// assert_eq!(result.rows[0].get("tags").unwrap().as_str(), Some("x"));
/// assert_eq!(result.rows[1].get("tags").unwrap().as_str(), Some("y"));
/// ```

use crate::value::CellValue;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// One flattened row: dotted-path field names mapped to scalar cell values.
///
/// Insertion order is preserved so that flattening is deterministic and row
/// equality is order-sensitive, matching the discovery order of the walk.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatRow {
    cells: Vec<(String, CellValue)>,
}

impl FlatRow {
    pub fn new() -> Self {
        FlatRow { cells: Vec::new() }
    }

    /// Insert a cell. A repeated field path overwrites in place, keeping the
    /// original position.
    pub fn insert(&mut self, field: impl Into<String>, value: CellValue) {
        let field = field.into();
        if let Some(cell) = self.cells.iter_mut().find(|(f, _)| *f == field) {
            cell.1 = value;
        } else {
            self.cells.push((field, value));
        }
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.cells.iter().any(|(f, _)| f == field)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(f, v)| (f.as_str(), v))
    }
}

/// Per-field override for array handling.
///
/// Some feeds carry container fields whose name should not participate in the
/// dotted path. An exception entry suppresses the prefix for child objects of
/// that array and renames the synthetic column used for its scalar elements.
#[derive(Debug, Clone)]
pub struct ArrayException {
    /// Children of this array are flattened with an empty prefix.
    pub strip_prefix: bool,
    /// Column name used when the array holds scalar elements.
    pub scalar_alias: String,
}

/// Lookup table of array-field exceptions, keyed by raw field name.
#[derive(Debug, Clone)]
pub struct ExceptionTable {
    entries: HashMap<String, ArrayException>,
}

impl ExceptionTable {
    /// An empty table: every array field gets plain dotted-path handling.
    pub fn empty() -> Self {
        ExceptionTable {
            entries: HashMap::new(),
        }
    }

    pub fn with_entry(mut self, name: impl Into<String>, exception: ArrayException) -> Self {
        self.entries.insert(name.into(), exception);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ArrayException> {
        self.entries.get(name)
    }
}

impl Default for ExceptionTable {
    /// The stock table carries the `"Routes"` rule: children of a `Routes`
    /// array are not prefixed with `Routes.`, and scalar elements land in a
    /// column named `value`.
    fn default() -> Self {
        ExceptionTable::empty().with_entry(
            "Routes",
            ArrayException {
                strip_prefix: true,
                scalar_alias: "value".to_string(),
            },
        )
    }
}

/// Output of a flattening pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlattenResult {
    pub rows: Vec<FlatRow>,
    /// Unique field paths in first-seen order across all records.
    pub field_order: Vec<String>,
}

impl FlattenResult {
    /// The full field set of the dataset: `field_order` plus any stray keys
    /// appearing only in later rows, in row-scan order. Rows downstream of
    /// the first may introduce fields absent from the first row's schema, so
    /// the key set is the union across all rows.
    pub fn field_set(&self) -> Vec<String> {
        let mut fields = self.field_order.clone();
        for row in &self.rows {
            for (field, _) in row.iter() {
                if !fields.iter().any(|f| f == field) {
                    fields.push(field.to_string());
                }
            }
        }
        fields
    }

    /// Export rows as a JSON array of objects with columns in field order.
    /// Fields missing from a row are emitted as null.
    pub fn to_json(&self) -> crate::error::Result<String> {
        let fields = self.field_set();
        let rows: Vec<JsonValue> = self
            .rows
            .iter()
            .map(|row| {
                let obj: Map<String, JsonValue> = fields
                    .iter()
                    .map(|field| {
                        let value = row
                            .get(field)
                            .map(CellValue::to_json)
                            .unwrap_or(JsonValue::Null);
                        (field.clone(), value)
                    })
                    .collect();
                JsonValue::Object(obj)
            })
            .collect();

        Ok(serde_json::to_string_pretty(&rows)?)
    }

    /// Export rows as CSV with a header row of field-ordered columns.
    /// NULL and missing cells become empty strings; values containing commas,
    /// quotes, or newlines are quoted and escaped.
    pub fn to_csv(&self) -> String {
        let fields = self.field_set();
        let mut result = String::new();

        result.push_str(&fields.join(","));
        result.push('\n');

        for row in &self.rows {
            let values: Vec<String> = fields
                .iter()
                .map(|field| {
                    let text = row.get(field).map(CellValue::render).unwrap_or_default();
                    if text.contains(',') || text.contains('"') || text.contains('\n') {
                        format!("\"{}\"", text.replace('"', "\"\""))
                    } else {
                        text
                    }
                })
                .collect();
            result.push_str(&values.join(","));
            result.push('\n');
        }
        result
    }
}

/// Flatten records using the stock exception table.
pub fn flatten(records: &[JsonValue]) -> FlattenResult {
    flatten_with_exceptions(records, &ExceptionTable::default())
}

/// Flatten records with a caller-supplied exception table.
///
/// Records that are not JSON objects yield no rows but are otherwise ignored;
/// payload normalization upstream keeps those out of the usual path.
pub fn flatten_with_exceptions(records: &[JsonValue], exceptions: &ExceptionTable) -> FlattenResult {
    let mut result = FlattenResult::default();

    for record in records {
        if let JsonValue::Object(obj) = record {
            flatten_object(
                obj,
                "",
                FlatRow::new(),
                exceptions,
                &mut result.field_order,
                &mut result.rows,
            );
        }
    }

    result
}

/// Join a dotted prefix with a key segment.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Register a path into the field order the first time it is seen.
fn register_field(field_order: &mut Vec<String>, path: &str) {
    if !field_order.iter().any(|f| f == path) {
        field_order.push(path.to_string());
    }
}

/// A deferred array field: raw name, dotted path at its position, elements.
struct DeferredArray<'a> {
    name: String,
    path: String,
    items: &'a [JsonValue],
}

/// Flatten one object level into completed rows.
///
/// Collection runs first: scalars and nested objects merge into `base`
/// (registering field paths), while array fields are deferred in encounter
/// order. Fan-out runs second, independently per array field; if no array
/// emitted anything the accumulated base itself is emitted once.
fn flatten_object(
    obj: &Map<String, JsonValue>,
    prefix: &str,
    base: FlatRow,
    exceptions: &ExceptionTable,
    field_order: &mut Vec<String>,
    rows: &mut Vec<FlatRow>,
) {
    let mut base = base;
    let mut arrays: Vec<DeferredArray<'_>> = Vec::new();

    collect_level(obj, prefix, &mut base, &mut arrays, field_order);

    if arrays.is_empty() {
        if !base.is_empty() {
            rows.push(base);
        }
        return;
    }

    let mut emitted = false;
    for array in &arrays {
        let exception = exceptions.get(&array.name);
        let strip_prefix = exception.map(|e| e.strip_prefix).unwrap_or(false);

        for item in array.items {
            match item {
                JsonValue::Object(child) => {
                    let child_prefix = if strip_prefix { "" } else { array.path.as_str() };
                    let before = rows.len();
                    flatten_object(
                        child,
                        child_prefix,
                        base.clone(),
                        exceptions,
                        field_order,
                        rows,
                    );
                    if rows.len() > before {
                        emitted = true;
                    }
                }
                scalar => {
                    // Scalar (or stringified composite) element: one row per
                    // element under the synthetic fan-out column.
                    let column = scalar_column(&array.name, &array.path, exception);
                    register_field(field_order, &column);
                    let mut row = base.clone();
                    row.insert(column, CellValue::from(scalar));
                    rows.push(row);
                    emitted = true;
                }
            }
        }
    }

    // Every array field was empty (or emitted nothing): keep the base row
    // rather than dropping the record.
    if !emitted && !base.is_empty() {
        rows.push(base);
    }
}

/// Collect scalars into the accumulator and defer arrays, recursing through
/// nested objects with an extended prefix. Object nesting never fans out.
fn collect_level<'a>(
    obj: &'a Map<String, JsonValue>,
    prefix: &str,
    base: &mut FlatRow,
    arrays: &mut Vec<DeferredArray<'a>>,
    field_order: &mut Vec<String>,
) {
    for (key, value) in obj {
        match value {
            JsonValue::Array(items) => {
                arrays.push(DeferredArray {
                    name: key.clone(),
                    path: join_path(prefix, key),
                    items,
                });
            }
            JsonValue::Object(child) => {
                collect_level(child, &join_path(prefix, key), base, arrays, field_order);
            }
            scalar => {
                let path = join_path(prefix, key);
                register_field(field_order, &path);
                base.insert(path, CellValue::from(scalar));
            }
        }
    }
}

/// Synthetic column name for scalar array elements: the array's dotted path,
/// with the exception alias (and prefix strip) applied when configured.
fn scalar_column(name: &str, path: &str, exception: Option<&ArrayException>) -> String {
    match exception {
        Some(e) if e.strip_prefix => e.scalar_alias.clone(),
        Some(e) => {
            let parent = path.strip_suffix(name).unwrap_or("").trim_end_matches('.');
            join_path(parent, &e.scalar_alias)
        }
        None => path.to_string(),
    }
}
