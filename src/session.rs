/// FlatTable Dataset Session
///
/// Drives the lifecycle of one table surface: dataset requests, the atomic
/// data-plus-preferences transition, and drift detection between consecutive
/// datasets. The model is single-threaded cooperative (nothing here locks),
/// but the session does enforce logical locking against re-entrant
/// triggering: duplicate requests for the same `(section code, tab)` pair are
/// suppressed while one is in flight, and the in-flight flag only clears
/// after the full transition plus a short settling delay.
///
/// Data population and preference application happen in one state
/// transition, so callers never observe a dataset rendered with default
/// columns that later snap to the saved layout.
///
/// # Examples
///
/// ```
/// use flattable::TableSession;
/// use serde_json::json;
/// use std::time::Instant;
///
/// let mut session = TableSession::new();
/// let now = Instant::now();
///
/// let id = session.begin_request("ENR_1_2", "table", now).unwrap();
/// let applied = session.complete_request(id, &json!({"results": [{"id": 1}]}), None, now);
///
/// assert!(applied);
/// assert_eq!(session.rows().len(), 1);
/// ```

use crate::column_state::ColumnState;
use crate::error::Result;
use crate::flatten::{flatten, FlatRow};
use crate::prefs::{self, PreferenceKey, PreferenceStore};
use crate::reconcile::reconcile;
use log::warn;
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};

/// How long a completed transition keeps absorbing repeated triggers.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);

pub type RequestId = u64;

/// Explicit request lifecycle; replaces ad-hoc in-flight flags.
#[derive(Debug, Clone, PartialEq)]
enum RequestState {
    Idle,
    Loading {
        id: RequestId,
        section_code: String,
        tab_type: String,
    },
    Settling {
        until: Instant,
        section_code: String,
        tab_type: String,
    },
}

/// The dataset currently installed in the session.
struct Dataset {
    section_code: String,
    rows: Vec<FlatRow>,
    field_set: Vec<String>,
    columns: ColumnState,
}

/// Session state machine for one table surface.
pub struct TableSession {
    state: RequestState,
    next_id: RequestId,
    current: Option<Dataset>,
}

impl TableSession {
    pub fn new() -> Self {
        TableSession {
            state: RequestState::Idle,
            next_id: 0,
            current: None,
        }
    }

    /// Start a dataset-processing request.
    ///
    /// Returns the request id to pass back to [`complete_request`], or `None`
    /// when a request for the same `(section code, tab)` pair is already in
    /// flight or still settling; duplicates are suppressed, never queued.
    /// A request for a *different* pair supersedes the in-flight one; its
    /// completion then arrives stale and is ignored.
    ///
    /// [`complete_request`]: TableSession::complete_request
    pub fn begin_request(
        &mut self,
        section_code: &str,
        tab_type: &str,
        now: Instant,
    ) -> Option<RequestId> {
        match &self.state {
            RequestState::Loading {
                section_code: s,
                tab_type: t,
                ..
            } if s == section_code && t == tab_type => {
                warn!(
                    "begin_request: ({}, {}) already in flight, suppressing",
                    section_code, tab_type
                );
                return None;
            }
            RequestState::Settling {
                until,
                section_code: s,
                tab_type: t,
            } if s == section_code && t == tab_type && now < *until => {
                warn!(
                    "begin_request: ({}, {}) still settling, suppressing",
                    section_code, tab_type
                );
                return None;
            }
            _ => {}
        }

        self.next_id += 1;
        self.state = RequestState::Loading {
            id: self.next_id,
            section_code: section_code.to_string(),
            tab_type: tab_type.to_string(),
        };
        Some(self.next_id)
    }

    /// Complete a request: normalize the payload, flatten, apply preferences,
    /// and install the dataset as one atomic transition. Returns `true` when
    /// the transition was applied.
    ///
    /// A completion whose id was superseded by a newer [`begin_request`] is a
    /// safe no-op. Reconciliation runs when the section code differs from the
    /// previous dataset's, or when the field set drifted under the same
    /// section code; otherwise the live column state is reused untouched.
    ///
    /// [`begin_request`]: TableSession::begin_request
    pub fn complete_request(
        &mut self,
        id: RequestId,
        payload: &JsonValue,
        pref_blob: Option<&str>,
        now: Instant,
    ) -> bool {
        let (section_code, tab_type) = match &self.state {
            RequestState::Loading {
                id: live,
                section_code,
                tab_type,
            } if *live == id => (section_code.clone(), tab_type.clone()),
            _ => {
                warn!("complete_request: request {} is stale, ignoring", id);
                return false;
            }
        };

        let records = normalize_records(payload);
        let result = flatten(&records);
        let field_set = result.field_set();

        let columns = match self.current.take() {
            Some(previous)
                if previous.section_code == section_code && previous.field_set == field_set =>
            {
                // Same section, no structural drift: keep the live state.
                previous.columns
            }
            _ => {
                let saved = match prefs::decode(pref_blob) {
                    Ok(saved) => saved,
                    Err(e) => {
                        warn!("complete_request: discarding unreadable preference blob: {}", e);
                        None
                    }
                };
                ColumnState::new(reconcile(&field_set, saved.as_ref()))
            }
        };

        self.current = Some(Dataset {
            section_code: section_code.clone(),
            rows: result.rows,
            field_set,
            columns,
        });
        self.state = RequestState::Settling {
            until: now + SETTLE_DELAY,
            section_code,
            tab_type,
        };

        true
    }

    /// Mutable access to the live column state, or `None` (logged) while a
    /// request is loading; mutations are rejected until the pending
    /// transition lands, so no half-applied layout is ever touched.
    pub fn columns_mut(&mut self) -> Option<&mut ColumnState> {
        if matches!(self.state, RequestState::Loading { .. }) {
            warn!("columns_mut: dataset request in flight, mutation rejected");
            return None;
        }
        self.current.as_mut().map(|d| &mut d.columns)
    }

    pub fn columns(&self) -> Option<&ColumnState> {
        self.current.as_ref().map(|d| &d.columns)
    }

    pub fn rows(&self) -> &[FlatRow] {
        self.current.as_ref().map(|d| d.rows.as_slice()).unwrap_or(&[])
    }

    pub fn field_set(&self) -> &[String] {
        self.current
            .as_ref()
            .map(|d| d.field_set.as_slice())
            .unwrap_or(&[])
    }

    pub fn section_code(&self) -> Option<&str> {
        self.current.as_ref().map(|d| d.section_code.as_str())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RequestState::Loading { .. })
    }

    /// Load a preference blob, degrading store failures to "no preferences"
    /// so data display is never blocked. A `None` key (no recognizable
    /// section code) disables loading outright.
    pub fn load_preferences(
        store: &dyn PreferenceStore,
        key: Option<&PreferenceKey>,
    ) -> Option<String> {
        let key = key?;
        match store.load(key) {
            Ok(blob) => blob,
            Err(e) => {
                warn!("load_preferences: store failure, using defaults: {}", e);
                None
            }
        }
    }

    /// Persist a copy of the live column configuration. Store failures are
    /// returned to the caller for a user-visible notification; the live
    /// state is never mutated by a save, successful or not.
    pub fn save_preferences(
        &self,
        store: &mut dyn PreferenceStore,
        key: &PreferenceKey,
    ) -> Result<()> {
        let Some(dataset) = &self.current else {
            warn!("save_preferences: no dataset installed, nothing to save");
            return Ok(());
        };
        let blob = prefs::encode(&dataset.columns.snapshot())?;
        store.save(key, &blob)
    }
}

impl Default for TableSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a dataset payload into a record array.
///
/// `{ "results": [...] }` unwraps the array; a bare array passes through; a
/// single object (or any other payload) wraps as a singleton rather than
/// failing.
pub fn normalize_records(payload: &JsonValue) -> Vec<JsonValue> {
    match payload {
        JsonValue::Array(items) => items.clone(),
        JsonValue::Object(map) => match map.get("results") {
            Some(JsonValue::Array(items)) => items.clone(),
            _ => vec![payload.clone()],
        },
        other => vec![other.clone()],
    }
}
