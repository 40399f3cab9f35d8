//! Property tests for the sparse diff/merge laws and the native codec.

use proptest::prelude::*;
use serde_json::{Map, Value};

use okapi_codec::{parse_native, to_native};
use okapi_config::{diff, dirty_keys, merge, values_equal};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z0-9 =.]{0,8}".prop_map(Value::String),
    ]
}

fn config(max_keys: usize) -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,6}", scalar(), 0..max_keys)
        .prop_map(|entries| entries.into_iter().collect())
}

/// A baseline plus a form that holds every baseline key, some of them edited.
fn baseline_and_form() -> impl Strategy<Value = (Map<String, Value>, Map<String, Value>)> {
    (config(8), config(4)).prop_map(|(baseline, edits)| {
        let form = merge(&baseline, &edits);
        (baseline, form)
    })
}

fn same_entries(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
}

proptest! {
    #[test]
    fn merge_of_diff_restores_form((baseline, form) in baseline_and_form()) {
        let sparse = diff(&form, &baseline);
        prop_assert!(same_entries(&merge(&baseline, &sparse), &form));
    }

    #[test]
    fn diff_against_itself_is_empty(baseline in config(8)) {
        prop_assert!(diff(&baseline, &baseline).is_empty());
    }

    #[test]
    fn diff_keeps_only_changed_entries((baseline, form) in baseline_and_form()) {
        for (key, value) in diff(&form, &baseline) {
            let unchanged = baseline.get(&key).is_some_and(|b| values_equal(&value, b));
            prop_assert!(!unchanged, "{} should not be in the diff", key);
        }
    }

    #[test]
    fn untouched_form_has_no_dirty_keys(defaults in config(8), preset in config(4)) {
        let baseline = merge(&defaults, &preset);
        let sparse = diff(&baseline, &defaults);
        prop_assert!(dirty_keys(&sparse, &baseline, &baseline).is_empty());
    }

    #[test]
    fn native_text_parses_back(config in config(8)) {
        let text = to_native(&config);
        let parsed = parse_native(&text).unwrap();
        prop_assert!(same_entries(&parsed, &config));
    }
}
