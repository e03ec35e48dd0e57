/// FlatTable Column State Manager
///
/// Owns the live, mutable column configuration during a session and exposes
/// the mutation operations (toggle, resize, reorder, lock/unlock). Every
/// mutation keeps the configuration internally consistent and yields a new,
/// fully-formed [`ColumnConfig`] snapshot; no partial intermediate state is
/// ever observable by the caller.
///
/// Operations naming a field outside the current dataset are logged no-ops;
/// nothing panics past this boundary.
///
/// # Examples
///
/// ```
/// use flattable::{reconcile, ColumnState};
///
/// let fields = vec!["id".to_string(), "name".to_string(), "tags".to_string()];
/// let mut state = ColumnState::new(reconcile(&fields, None));
///
/// let snapshot = state.toggle_visibility("name");
/// assert!(!snapshot.visibility["name"]);
/// assert_eq!(state.recently_hidden(), ["name"]);
///
/// let snapshot = state.resize("id", -500);
/// assert_eq!(snapshot.widths["id"], 100); // clamped
/// ```

use crate::reconcile::{ColumnConfig, MIN_COLUMN_WIDTH};
use log::warn;

/// Maximum number of entries kept on the quick-restore list.
const RECENTLY_HIDDEN_LIMIT: usize = 5;

/// Live column state for one dataset session.
#[derive(Debug, Clone)]
pub struct ColumnState {
    config: ColumnConfig,
    /// Most-recent-first, de-duplicated list of fields hidden via
    /// `toggle_visibility`, capped at [`RECENTLY_HIDDEN_LIMIT`].
    recently_hidden: Vec<String>,
}

impl ColumnState {
    /// Take ownership of a reconciled configuration.
    ///
    /// The locked list is re-synced to the order's relative order on entry,
    /// so the subsequence invariant holds no matter what the saved blob
    /// contained.
    pub fn new(config: ColumnConfig) -> Self {
        let mut state = ColumnState {
            config,
            recently_hidden: Vec::new(),
        };
        state.resync_locked();
        state
    }

    /// Read access to the live configuration.
    pub fn config(&self) -> &ColumnConfig {
        &self.config
    }

    /// A complete copy of the configuration, for persisting or passing to an
    /// external layer. The live object is never shared.
    pub fn snapshot(&self) -> ColumnConfig {
        self.config.clone()
    }

    pub fn recently_hidden(&self) -> &[String] {
        &self.recently_hidden
    }

    fn known(&self, field: &str) -> bool {
        self.config.order.iter().any(|f| f == field)
    }

    /// Keep `locked` a subsequence of `order` with matching relative order.
    fn resync_locked(&mut self) {
        let order = &self.config.order;
        self.config
            .locked
            .retain(|f| order.iter().any(|o| o == f));
        self.config
            .locked
            .sort_by_key(|f| order.iter().position(|o| o == f).unwrap_or(usize::MAX));
    }

    /// Flip a field's visibility. Hiding pushes the field onto the bounded
    /// recently-hidden list; showing removes it again.
    pub fn toggle_visibility(&mut self, field: &str) -> ColumnConfig {
        if !self.known(field) {
            warn!("toggle_visibility: unknown field '{}'", field);
            return self.snapshot();
        }

        let now_visible = !self.config.is_visible(field);
        self.config.visibility.insert(field.to_string(), now_visible);

        if now_visible {
            self.recently_hidden.retain(|f| f != field);
        } else {
            self.recently_hidden.retain(|f| f != field);
            self.recently_hidden.insert(0, field.to_string());
            self.recently_hidden.truncate(RECENTLY_HIDDEN_LIMIT);
        }

        self.snapshot()
    }

    /// Restore a field from the quick-restore list. Unknown entries are
    /// dropped from the list without touching visibility.
    pub fn restore_recently_hidden(&mut self, field: &str) -> ColumnConfig {
        if !self.recently_hidden.iter().any(|f| f == field) {
            warn!("restore_recently_hidden: '{}' is not on the list", field);
            return self.snapshot();
        }
        self.recently_hidden.retain(|f| f != field);
        if self.known(field) {
            self.config.visibility.insert(field.to_string(), true);
        }
        self.snapshot()
    }

    /// Bulk-set every field's visibility.
    pub fn set_all_visible(&mut self, visible: bool) -> ColumnConfig {
        for field in &self.config.order {
            self.config.visibility.insert(field.clone(), visible);
        }
        if visible {
            self.recently_hidden.clear();
        }
        self.snapshot()
    }

    /// Adjust a field's width by a pixel delta, clamped at
    /// [`MIN_COLUMN_WIDTH`]. Widths never reach zero or go negative.
    pub fn resize(&mut self, field: &str, delta_px: i32) -> ColumnConfig {
        if !self.known(field) {
            warn!("resize: unknown field '{}'", field);
            return self.snapshot();
        }

        let current = self.config.width_of(field);
        let resized = (current as i64 + delta_px as i64).max(MIN_COLUMN_WIDTH as i64) as u32;
        self.config.widths.insert(field.to_string(), resized);
        self.snapshot()
    }

    /// Move `dragged` to `target`'s position in the column order. A no-op if
    /// either field is unknown or they are equal.
    pub fn reorder(&mut self, dragged: &str, target: &str) -> ColumnConfig {
        if dragged == target {
            return self.snapshot();
        }
        let Some(from) = self.config.order.iter().position(|f| f == dragged) else {
            warn!("reorder: unknown field '{}'", dragged);
            return self.snapshot();
        };
        let Some(to) = self.config.order.iter().position(|f| f == target) else {
            warn!("reorder: unknown field '{}'", target);
            return self.snapshot();
        };

        // Both indices resolve before the removal; the dragged column lands
        // at the target's original position.
        let moved = self.config.order.remove(from);
        let to = to.min(self.config.order.len());
        self.config.order.insert(to, moved);

        self.resync_locked();
        self.snapshot()
    }

    /// Pin a column. The insertion position keeps the locked list's relative
    /// order matching the column order.
    pub fn lock(&mut self, field: &str) -> ColumnConfig {
        if !self.known(field) {
            warn!("lock: unknown field '{}'", field);
            return self.snapshot();
        }
        if self.config.locked.iter().any(|f| f == field) {
            return self.snapshot();
        }

        let order_index = |f: &str| self.config.order.iter().position(|o| o == f);
        let target_index = order_index(field).unwrap_or(usize::MAX);
        let insert_at = self
            .config
            .locked
            .iter()
            .position(|f| order_index(f).unwrap_or(usize::MAX) > target_index)
            .unwrap_or(self.config.locked.len());

        self.config.locked.insert(insert_at, field.to_string());
        self.snapshot()
    }

    /// Unpin a column.
    pub fn unlock(&mut self, field: &str) -> ColumnConfig {
        if !self.config.locked.iter().any(|f| f == field) {
            warn!("unlock: '{}' is not locked", field);
            return self.snapshot();
        }
        self.config.locked.retain(|f| f != field);
        self.snapshot()
    }

    /// Horizontal pixel offsets of the pinned columns: for each locked field
    /// in locked order, the cumulative width of the locked fields before it.
    pub fn sticky_offsets(&self) -> Vec<(String, u32)> {
        let mut offsets = Vec::with_capacity(self.config.locked.len());
        let mut cumulative = 0;
        for field in &self.config.locked {
            offsets.push((field.clone(), cumulative));
            cumulative += self.config.width_of(field);
        }
        offsets
    }
}
