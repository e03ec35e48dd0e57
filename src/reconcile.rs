/// FlatTable Schema Reconciler
///
/// Merges the field set of a freshly flattened dataset with a previously
/// saved column configuration, producing a valid, complete configuration that
/// covers every current column and discards stale ones.
///
/// # Examples
///
/// ```
/// use flattable::{reconcile, ColumnConfig};
///
/// let fields = vec!["id".to_string(), "name".to_string()];
/// let config = reconcile(&fields, None);
///
/// assert_eq!(config.order, vec!["id", "name"]);
/// assert_eq!(config.widths["name"], 200);
/// assert!(config.visibility["id"]);
/// ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default column width in pixels.
pub const DEFAULT_COLUMN_WIDTH: u32 = 200;

/// Columns never shrink below this width.
pub const MIN_COLUMN_WIDTH: u32 = 100;

/// Display configuration for the columns of one dataset.
///
/// Invariants (guaranteed after reconciliation, maintained by the column
/// state manager):
/// - `visibility`, `widths`, `order`, and `locked` only reference members of
///   the current dataset's field set;
/// - `order` holds each field exactly once;
/// - `locked` is a subsequence of `order` preserving relative order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub visibility: HashMap<String, bool>,
    pub widths: HashMap<String, u32>,
    pub order: Vec<String>,
    pub locked: Vec<String>,
}

impl ColumnConfig {
    pub fn is_empty(&self) -> bool {
        self.visibility.is_empty()
            && self.widths.is_empty()
            && self.order.is_empty()
            && self.locked.is_empty()
    }

    /// Width of a field, falling back to the default for unknown fields.
    pub fn width_of(&self, field: &str) -> u32 {
        self.widths.get(field).copied().unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// True unless the field has been explicitly hidden.
    pub fn is_visible(&self, field: &str) -> bool {
        self.visibility.get(field).copied().unwrap_or(true)
    }
}

/// Merge a dataset's current fields with a saved configuration.
///
/// Each sub-field reconciles independently:
/// - visibility starts from the saved map when non-empty, defaulting any
///   newly appeared field to visible;
/// - widths are kept only for current fields, defaulting to
///   [`DEFAULT_COLUMN_WIDTH`] otherwise;
/// - order keeps the saved order minus stale entries, then appends missing
///   current fields in discovery order;
/// - locked is the saved locked list filtered to current fields; new locked
///   columns are never invented.
///
/// Re-running on its own output with an unchanged field set is a no-op.
pub fn reconcile(current_fields: &[String], saved: Option<&ColumnConfig>) -> ColumnConfig {
    let saved = saved.filter(|c| !c.is_empty());

    let visibility: HashMap<String, bool> = current_fields
        .iter()
        .map(|field| {
            let visible = saved
                .filter(|c| !c.visibility.is_empty())
                .and_then(|c| c.visibility.get(field).copied())
                .unwrap_or(true);
            (field.clone(), visible)
        })
        .collect();

    let widths: HashMap<String, u32> = current_fields
        .iter()
        .map(|field| {
            let width = saved
                .and_then(|c| c.widths.get(field).copied())
                .unwrap_or(DEFAULT_COLUMN_WIDTH);
            (field.clone(), width)
        })
        .collect();

    let mut order: Vec<String> = saved
        .map(|c| {
            c.order
                .iter()
                .filter(|f| current_fields.contains(*f))
                .cloned()
                .collect::<Vec<String>>()
        })
        .unwrap_or_default();
    for field in current_fields {
        if !order.contains(field) {
            order.push(field.clone());
        }
    }

    let locked: Vec<String> = saved
        .map(|c| {
            c.locked
                .iter()
                .filter(|f| current_fields.contains(*f))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    ColumnConfig {
        visibility,
        widths,
        order,
        locked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_with_no_saved_config() {
        let current = fields(&["a", "b", "c"]);
        let config = reconcile(&current, None);

        assert_eq!(config.order, current);
        assert!(config.locked.is_empty());
        for f in &current {
            assert!(config.visibility[f]);
            assert_eq!(config.widths[f], DEFAULT_COLUMN_WIDTH);
        }
    }

    #[test]
    fn test_saved_values_survive_for_current_fields() {
        let current = fields(&["a", "b"]);
        let mut saved = ColumnConfig::default();
        saved.visibility.insert("a".to_string(), false);
        saved.widths.insert("a".to_string(), 320);
        saved.order = fields(&["b", "a"]);
        saved.locked = fields(&["b"]);

        let config = reconcile(&current, Some(&saved));

        assert!(!config.visibility["a"]);
        assert!(config.visibility["b"]); // absent from saved map -> visible
        assert_eq!(config.widths["a"], 320);
        assert_eq!(config.widths["b"], DEFAULT_COLUMN_WIDTH);
        assert_eq!(config.order, fields(&["b", "a"]));
        assert_eq!(config.locked, fields(&["b"]));
    }

    #[test]
    fn test_stale_fields_are_dropped() {
        let current = fields(&["a"]);
        let mut saved = ColumnConfig::default();
        saved.visibility.insert("gone".to_string(), false);
        saved.visibility.insert("a".to_string(), true);
        saved.widths.insert("gone".to_string(), 500);
        saved.order = fields(&["gone", "a"]);
        saved.locked = fields(&["gone", "a"]);

        let config = reconcile(&current, Some(&saved));

        assert!(!config.visibility.contains_key("gone"));
        assert!(!config.widths.contains_key("gone"));
        assert_eq!(config.order, fields(&["a"]));
        assert_eq!(config.locked, fields(&["a"]));
    }

    #[test]
    fn test_new_fields_append_in_discovery_order() {
        let current = fields(&["a", "b", "c", "d"]);
        let mut saved = ColumnConfig::default();
        saved.order = fields(&["c", "a"]);
        saved.widths.insert("c".to_string(), 150);

        let config = reconcile(&current, Some(&saved));

        // Saved head preserved, missing fields appended in discovery order.
        assert_eq!(config.order, fields(&["c", "a", "b", "d"]));
    }

    #[test]
    fn test_empty_saved_config_counts_as_absent() {
        let current = fields(&["a"]);
        let config = reconcile(&current, Some(&ColumnConfig::default()));

        assert!(config.visibility["a"]);
        assert_eq!(config.widths["a"], DEFAULT_COLUMN_WIDTH);
        assert_eq!(config.order, fields(&["a"]));
    }

    #[test]
    fn test_idempotence() {
        let current = fields(&["x", "y", "z"]);
        let mut saved = ColumnConfig::default();
        saved.visibility.insert("y".to_string(), false);
        saved.widths.insert("z".to_string(), 260);
        saved.order = fields(&["z", "y"]);
        saved.locked = fields(&["z"]);

        let once = reconcile(&current, Some(&saved));
        let twice = reconcile(&current, Some(&once));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_completeness() {
        let current = fields(&["p", "q", "r"]);
        let mut saved = ColumnConfig::default();
        saved.order = fields(&["r"]);

        let config = reconcile(&current, Some(&saved));

        for f in &current {
            assert!(config.visibility.contains_key(f));
            assert!(config.widths.contains_key(f));
            assert_eq!(config.order.iter().filter(|o| *o == f).count(), 1);
        }
    }

    #[test]
    fn test_locked_relative_order_preserved() {
        let current = fields(&["a", "b", "c"]);
        let mut saved = ColumnConfig::default();
        saved.locked = fields(&["c", "gone", "a"]);

        let config = reconcile(&current, Some(&saved));

        assert_eq!(config.locked, fields(&["c", "a"]));
    }
}
