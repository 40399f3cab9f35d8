//! Dirty-key tracking
//!
//! A key is dirty when it appears in the sparse config and its form value
//! differs from the active baseline. This separates "present because the
//! schema has no default for it" from "present because the user changed
//! it". Highlighting only; serialized bytes are unaffected.

use std::collections::BTreeSet;

use serde_json::Value;

use okapi_codec::{extract_key, Syntax};

use crate::diff::differs;
use crate::{BaselineMap, FormState, SparseConfig};

/// Keys of `sparse` whose form value differs from `baseline`.
pub fn dirty_keys(sparse: &SparseConfig, form: &FormState, baseline: &BaselineMap) -> BTreeSet<String> {
    sparse
        .keys()
        .filter(|key| {
            form.get(key.as_str())
                .is_some_and(|value| differs(value, baseline.get(key.as_str())))
        })
        .cloned()
        .collect()
}

/// Per-field "modified" indicator.
///
/// With a default, the field is modified when its value differs from it.
/// Without one, any present, non-null, non-empty value counts.
pub fn field_modified(key: &str, form: &FormState, defaults: &BaselineMap) -> bool {
    let current = form.get(key);
    match defaults.get(key) {
        Some(default) => current.map_or(true, |value| differs(value, Some(default))),
        None => match current {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        },
    }
}

/// Zero-based indices of rendered lines that carry a dirty key.
pub fn dirty_lines(text: &str, syntax: Syntax, dirty: &BTreeSet<String>) -> BTreeSet<usize> {
    if dirty.is_empty() || text.is_empty() {
        return BTreeSet::new();
    }
    text.split('\n')
        .enumerate()
        .filter(|(_, line)| extract_key(line, syntax).is_some_and(|key| dirty.contains(key)))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use serde_json::json;

    fn map(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_preset_value_not_dirty() {
        let defaults = map(json!({"x": 0}));
        let preset_baseline = map(json!({"x": 5}));
        let form = map(json!({"x": 5}));

        let sparse = diff(&form, &defaults);
        assert_eq!(Value::Object(sparse.clone()), json!({"x": 5}));
        assert!(dirty_keys(&sparse, &form, &preset_baseline).is_empty());

        let edited = map(json!({"x": 7}));
        let sparse = diff(&edited, &defaults);
        let dirty = dirty_keys(&sparse, &edited, &preset_baseline);
        assert!(dirty.contains("x"));
    }

    #[test]
    fn test_key_without_baseline_is_dirty() {
        let form = map(json!({"rules": ["a"]}));
        let sparse = diff(&form, &map(json!({})));
        assert!(dirty_keys(&sparse, &form, &map(json!({}))).contains("rules"));
    }

    #[test]
    fn test_field_modified() {
        let defaults = map(json!({"flag": false}));
        assert!(!field_modified("flag", &map(json!({"flag": false})), &defaults));
        assert!(field_modified("flag", &map(json!({"flag": true})), &defaults));

        let none = map(json!({}));
        assert!(!field_modified("note", &map(json!({"note": ""})), &none));
        assert!(!field_modified("note", &map(json!({"note": null})), &none));
        assert!(!field_modified("note", &none, &none));
        assert!(field_modified("note", &map(json!({"note": "x"})), &none));
        assert!(field_modified("list", &map(json!({"list": []})), &none));
    }

    #[test]
    fn test_dirty_lines_native() {
        let text = "#v1\nflag.b=true\ncount.i=3\nname=x";
        let dirty: BTreeSet<String> = ["count".to_string()].into();
        assert_eq!(dirty_lines(text, Syntax::Native, &dirty), BTreeSet::from([2]));
    }

    #[test]
    fn test_dirty_lines_yaml_skips_items() {
        let text = "count: 3\nlist:\n- count: 1\nname: x";
        let dirty: BTreeSet<String> = ["count".to_string(), "list".to_string()].into();
        assert_eq!(dirty_lines(text, Syntax::Yaml, &dirty), BTreeSet::from([0, 1]));
    }

    #[test]
    fn test_dirty_lines_json() {
        let text = "{\n  \"a\": 1,\n  \"b\": 2\n}";
        let dirty: BTreeSet<String> = ["b".to_string()].into();
        assert_eq!(dirty_lines(text, Syntax::Json, &dirty), BTreeSet::from([2]));
        assert!(dirty_lines(text, Syntax::Json, &BTreeSet::new()).is_empty());
    }
}
