/// FlatTable Search Index
///
/// On-demand text search over the raw (pre-flattening) nested JSON. Matches
/// are case-insensitive substring hits on object keys and primitive values,
/// tagged with the path from the root so the embedding layer can highlight
/// and auto-expand to them. Results are recomputed on every term change and
/// never cached.
///
/// # Examples
///
/// ```
/// use flattable::{search, MatchKind, PathSegment};
/// use serde_json::json;
///
/// let raw = json!({"a": {"b": "foobar"}});
/// let results = search(&raw, "foo");
///
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].match_in, MatchKind::Value);
/// assert_eq!(
///     results[0].path,
///     vec![PathSegment::key("a"), PathSegment::key("b")]
/// );
/// ```

use serde_json::Value as JsonValue;

/// One step of a path from the JSON root to a matched node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(k: impl Into<String>) -> Self {
        PathSegment::Key(k.into())
    }
}

/// Whether the hit was on a key or on a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Key,
    Value,
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub path: Vec<PathSegment>,
    pub match_in: MatchKind,
}

/// Search the raw JSON for a case-insensitive substring.
///
/// Recurses through nested objects and arrays; object elements of arrays are
/// entered with their numeric index as a path segment. `null` values are
/// skipped entirely. An empty term yields no results. Results come back in
/// pre-order traversal order with keys in declaration order.
pub fn search(raw: &JsonValue, term: &str) -> Vec<SearchResult> {
    let mut results = Vec::new();
    if term.is_empty() {
        return results;
    }
    let needle = term.to_lowercase();
    walk(raw, &mut Vec::new(), &needle, &mut results);
    results
}

fn walk(
    value: &JsonValue,
    path: &mut Vec<PathSegment>,
    needle: &str,
    results: &mut Vec<SearchResult>,
) {
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                // Null entries contribute nothing, not even a key match.
                if child.is_null() {
                    continue;
                }
                path.push(PathSegment::key(key));
                if key.to_lowercase().contains(needle) {
                    results.push(SearchResult {
                        path: path.clone(),
                        match_in: MatchKind::Key,
                    });
                }
                walk(child, path, needle, results);
                path.pop();
            }
        }
        JsonValue::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                walk(child, path, needle, results);
                path.pop();
            }
        }
        JsonValue::Null => {}
        JsonValue::String(s) => {
            if s.to_lowercase().contains(needle) {
                results.push(SearchResult {
                    path: path.clone(),
                    match_in: MatchKind::Value,
                });
            }
        }
        JsonValue::Number(n) => {
            if n.to_string().to_lowercase().contains(needle) {
                results.push(SearchResult {
                    path: path.clone(),
                    match_in: MatchKind::Value,
                });
            }
        }
        JsonValue::Bool(b) => {
            if b.to_string().contains(needle) {
                results.push(SearchResult {
                    path: path.clone(),
                    match_in: MatchKind::Value,
                });
            }
        }
    }
}

/// True when some result's path starts with `candidate` as a prefix. A node
/// should auto-expand while searching if a hit lives at or beneath it.
pub fn path_is_ancestor_of_any(results: &[SearchResult], candidate: &[PathSegment]) -> bool {
    results
        .iter()
        .any(|r| r.path.len() >= candidate.len() && r.path[..candidate.len()] == *candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_match_with_path() {
        let raw = json!({"a": {"b": "foobar"}});
        let results = search(&raw, "foo");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_in, MatchKind::Value);
        assert_eq!(
            results[0].path,
            vec![PathSegment::key("a"), PathSegment::key("b")]
        );
    }

    #[test]
    fn test_key_match() {
        let raw = json!({"frequency": 121.5});
        let results = search(&raw, "freq");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_in, MatchKind::Key);
        assert_eq!(results[0].path, vec![PathSegment::key("frequency")]);
    }

    #[test]
    fn test_case_insensitive() {
        let raw = json!({"Name": "AlPha"});
        assert_eq!(search(&raw, "name").len(), 1);
        assert_eq!(search(&raw, "ALPHA").len(), 1);
    }

    #[test]
    fn test_empty_term_yields_nothing() {
        let raw = json!({"a": "a"});
        assert!(search(&raw, "").is_empty());
    }

    #[test]
    fn test_null_values_skipped() {
        let raw = json!({"a": null, "ab": 1});
        assert!(search(&raw, "null").is_empty());
        // A null entry contributes no key match either.
        let results = search(&raw, "a");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].path, vec![PathSegment::key("ab")]);
    }

    #[test]
    fn test_array_objects_recursed_with_index_segment() {
        let raw = json!({"items": [{"code": "zulu"}, {"code": "yankee"}]});
        let results = search(&raw, "yankee");

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].path,
            vec![
                PathSegment::key("items"),
                PathSegment::Index(1),
                PathSegment::key("code")
            ]
        );
    }

    #[test]
    fn test_scalar_array_elements_match() {
        let raw = json!({"tags": ["alpha", "beta"]});
        let results = search(&raw, "beta");

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].path,
            vec![PathSegment::key("tags"), PathSegment::Index(1)]
        );
    }

    #[test]
    fn test_number_and_bool_values_match() {
        let raw = json!({"freq": 121.5, "active": true});
        assert_eq!(search(&raw, "121.5").len(), 1);
        assert_eq!(search(&raw, "true").len(), 1);
    }

    #[test]
    fn test_preorder_traversal_order() {
        let raw = json!({
            "abc": {"abcd": 1},
            "xabc": 2
        });
        let results = search(&raw, "abc");

        let paths: Vec<&Vec<PathSegment>> = results.iter().map(|r| &r.path).collect();
        assert_eq!(
            paths,
            vec![
                &vec![PathSegment::key("abc")],
                &vec![PathSegment::key("abc"), PathSegment::key("abcd")],
                &vec![PathSegment::key("xabc")],
            ]
        );
    }

    #[test]
    fn test_ancestor_predicate() {
        let raw = json!({"a": {"b": {"c": "hit"}}, "d": "miss"});
        let results = search(&raw, "hit");

        assert!(path_is_ancestor_of_any(&results, &[PathSegment::key("a")]));
        assert!(path_is_ancestor_of_any(
            &results,
            &[PathSegment::key("a"), PathSegment::key("b")]
        ));
        // The exact hit path counts as its own ancestor.
        assert!(path_is_ancestor_of_any(
            &results,
            &[
                PathSegment::key("a"),
                PathSegment::key("b"),
                PathSegment::key("c")
            ]
        ));
        assert!(!path_is_ancestor_of_any(&results, &[PathSegment::key("d")]));
    }

    #[test]
    fn test_results_recomputed_per_term() {
        let raw = json!({"a": "one", "b": "two"});
        assert_eq!(search(&raw, "one").len(), 1);
        assert_eq!(search(&raw, "two").len(), 1);
        assert_eq!(search(&raw, "three").len(), 0);
    }
}
