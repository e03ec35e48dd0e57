/// FlatTable Cell Values
///
/// A CellValue is the scalar content of one table cell after flattening.
/// JSON scalars map directly; composite values that reach a cell (an array
/// nested inside another array, for example) are JSON-stringified. That is
/// the only coercion the engine performs.

use serde_json::Value as JsonValue;

/// Scalar cell value enum to support the JSON primitive types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert back to a JSON value for export.
    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::String(v) => JsonValue::String(v.clone()),
            CellValue::Int(v) => JsonValue::Number((*v).into()),
            CellValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            CellValue::Bool(v) => JsonValue::Bool(*v),
            CellValue::Null => JsonValue::Null,
        }
    }

    /// Render as plain text for CSV export. NULL renders empty.
    pub fn render(&self) -> String {
        match self {
            CellValue::String(v) => v.clone(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(v) => v.to_string(),
            CellValue::Null => String::new(),
        }
    }
}

impl From<&JsonValue> for CellValue {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else {
                    CellValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => CellValue::String(s.clone()),
            // Composite values landing in a cell are stringified as-is.
            other => CellValue::String(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(CellValue::from(&json!(42)), CellValue::Int(42));
        assert_eq!(CellValue::from(&json!(1.5)), CellValue::Float(1.5));
        assert_eq!(CellValue::from(&json!("hi")), CellValue::String("hi".to_string()));
        assert_eq!(CellValue::from(&json!(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from(&json!(null)), CellValue::Null);
    }

    #[test]
    fn test_composite_values_stringify() {
        let v = CellValue::from(&json!([1, 2]));
        assert_eq!(v, CellValue::String("[1,2]".to_string()));

        let v = CellValue::from(&json!({"a": 1}));
        assert_eq!(v.as_str(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_render() {
        assert_eq!(CellValue::Null.render(), "");
        assert_eq!(CellValue::Int(7).render(), "7");
        assert_eq!(CellValue::Bool(false).render(), "false");
    }

    #[test]
    fn test_json_round_trip() {
        for v in [json!(1), json!("x"), json!(true), json!(null), json!(2.25)] {
            assert_eq!(CellValue::from(&v).to_json(), v);
        }
    }
}
