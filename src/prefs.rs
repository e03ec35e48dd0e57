/// FlatTable Preference Codec
///
/// Serializes column configurations to and from the external preference
/// store's blob format, and derives the `(base filename, section code, tab)`
/// key that partitions saved preferences. The codec only handles snapshots;
/// it never holds a reference to the live configuration.
///
/// Blob filenames follow `{base}_{section}_{tab}.json`, where the base name
/// strips a trailing `.pdf` case-insensitively and the section code is
/// extracted from a JSON filename via `_(ENR|AD|GEN|AMDT)_<digits>(_<digits>)?`
/// (case-insensitive). A filename without a section code disables save/load
/// for that file.

use crate::error::Result;
use crate::reconcile::ColumnConfig;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::OnceLock;

fn section_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)_(ENR|AD|GEN|AMDT)_(\d+)(?:_(\d+))?").expect("section pattern is valid")
    })
}

/// Extract a canonical section code (e.g. `ENR_1_2`) from a JSON filename.
/// Returns `None` when no section marker is present.
pub fn extract_section_code(json_filename: &str) -> Option<String> {
    let captures = section_pattern().captures(json_filename)?;
    let kind = captures.get(1)?.as_str().to_uppercase();
    let major = captures.get(2)?.as_str();
    match captures.get(3) {
        Some(minor) => Some(format!("{}_{}_{}", kind, major, minor.as_str())),
        None => Some(format!("{}_{}", kind, major)),
    }
}

/// Strip a trailing `.pdf` (case-insensitive) from a source filename.
pub fn base_filename(pdf_filename: &str) -> String {
    if pdf_filename.to_lowercase().ends_with(".pdf") {
        pdf_filename[..pdf_filename.len() - 4].to_string()
    } else {
        pdf_filename.to_string()
    }
}

/// Key identifying one persisted preference blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreferenceKey {
    pub base_filename: String,
    pub section_code: String,
    pub tab_type: String,
}

impl PreferenceKey {
    /// Build the key for a dataset, or `None` when the JSON filename carries
    /// no recognizable section code (persistence is disabled for that file).
    pub fn for_file(pdf_filename: &str, json_filename: &str, tab_type: &str) -> Option<Self> {
        let section_code = extract_section_code(json_filename)?;
        Some(PreferenceKey {
            base_filename: base_filename(pdf_filename),
            section_code,
            tab_type: tab_type.to_string(),
        })
    }

    /// Conventional filename for the persisted blob.
    pub fn blob_filename(&self) -> String {
        format!(
            "{}_{}_{}.json",
            self.base_filename, self.section_code, self.tab_type
        )
    }
}

/// Encode a configuration snapshot as a JSON blob.
pub fn encode(config: &ColumnConfig) -> Result<String> {
    Ok(serde_json::to_string(config)?)
}

/// Decode a blob into a configuration.
///
/// An absent, empty, or `{}` blob (the store returns an empty object for
/// missing keys) decodes to `None`, the reconciler's "no saved preferences"
/// input. A present but malformed blob is a codec error.
pub fn decode(blob: Option<&str>) -> Result<Option<ColumnConfig>> {
    let Some(blob) = blob else {
        return Ok(None);
    };
    if blob.trim().is_empty() {
        return Ok(None);
    }

    let value: JsonValue = serde_json::from_str(blob)?;
    match &value {
        JsonValue::Object(map) if map.is_empty() => Ok(None),
        JsonValue::Null => Ok(None),
        _ => {
            let config: ColumnConfig = serde_json::from_value(value)?;
            Ok(Some(config))
        }
    }
}

/// External preference store contract. `load` returns `None` for a missing
/// blob; transport failures map to [`Error::Store`].
pub trait PreferenceStore {
    fn load(&self, key: &PreferenceKey) -> Result<Option<String>>;
    fn save(&mut self, key: &PreferenceKey, blob: &str) -> Result<()>;
}

/// HashMap-backed store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    blobs: HashMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, key: &PreferenceKey) -> Result<Option<String>> {
        Ok(self.blobs.get(&key.blob_filename()).cloned())
    }

    fn save(&mut self, key: &PreferenceKey, blob: &str) -> Result<()> {
        self.blobs.insert(key.blob_filename(), blob.to_string());
        Ok(())
    }
}

/// A store whose save always fails; exercises the degraded path in tests.
#[cfg(test)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl PreferenceStore for FailingStore {
    fn load(&self, _key: &PreferenceKey) -> Result<Option<String>> {
        Err(crate::error::Error::Store("connection refused".to_string()))
    }

    fn save(&mut self, _key: &PreferenceKey, _blob: &str) -> Result<()> {
        Err(crate::error::Error::Store("connection refused".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile;

    #[test]
    fn test_extract_section_code() {
        assert_eq!(
            extract_section_code("chart_ENR_1_2.json"),
            Some("ENR_1_2".to_string())
        );
        assert_eq!(
            extract_section_code("chart_AD_3.json"),
            Some("AD_3".to_string())
        );
        assert_eq!(
            extract_section_code("pack_amdt_12_4.json"),
            Some("AMDT_12_4".to_string())
        );
        assert_eq!(
            extract_section_code("airport_gen_2.json"),
            Some("GEN_2".to_string())
        );
    }

    #[test]
    fn test_extract_section_code_negative() {
        assert_eq!(extract_section_code("notes.json"), None);
        assert_eq!(extract_section_code("chart_XYZ_1.json"), None);
        assert_eq!(extract_section_code("ENR_1.json"), None); // no leading underscore
    }

    #[test]
    fn test_base_filename_strips_pdf() {
        assert_eq!(base_filename("chart.pdf"), "chart");
        assert_eq!(base_filename("CHART.PDF"), "CHART");
        assert_eq!(base_filename("data.json"), "data.json");
    }

    #[test]
    fn test_key_and_blob_filename() {
        let key = PreferenceKey::for_file("chart.pdf", "chart_ENR_1_2.json", "table").unwrap();
        assert_eq!(key.blob_filename(), "chart_ENR_1_2_table.json");

        assert!(PreferenceKey::for_file("chart.pdf", "notes.json", "table").is_none());
    }

    #[test]
    fn test_round_trip() {
        let fields: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut config = reconcile(&fields, None);
        config.widths.insert("b".to_string(), 340);
        config.visibility.insert("c".to_string(), false);
        config.order = vec!["c".to_string(), "a".to_string(), "b".to_string()];
        config.locked = vec!["c".to_string(), "b".to_string()];

        let blob = encode(&config).unwrap();
        let decoded = decode(Some(&blob)).unwrap();
        assert_eq!(decoded, Some(config));
    }

    #[test]
    fn test_decode_absent_or_empty() {
        assert_eq!(decode(None).unwrap(), None);
        assert_eq!(decode(Some("")).unwrap(), None);
        assert_eq!(decode(Some("   ")).unwrap(), None);
        assert_eq!(decode(Some("{}")).unwrap(), None);
        assert_eq!(decode(Some("null")).unwrap(), None);
    }

    #[test]
    fn test_decode_malformed_is_error() {
        assert!(decode(Some("{not json")).is_err());
    }

    #[test]
    fn test_memory_store() {
        let key = PreferenceKey::for_file("a.pdf", "a_ENR_1.json", "table").unwrap();
        let mut store = MemoryPreferenceStore::new();

        assert_eq!(store.load(&key).unwrap(), None);
        store.save(&key, "{\"order\":[]}").unwrap();
        assert_eq!(store.load(&key).unwrap().as_deref(), Some("{\"order\":[]}"));
    }
}
