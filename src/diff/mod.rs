//! Sparse diff engine
//!
//! `diff` keeps the form entries that differ from the baseline; `merge`
//! overlays a sparse config back onto a baseline. For every key the form
//! holds, `merge(b, diff(f, b))` reproduces `f`.

use serde_json::Value;

use crate::{BaselineMap, FormState, SparseConfig};

/// Value equality as the serialized JSON would see it: object key order is
/// ignored, array order matters, and `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, xv)| y.get(key).is_some_and(|yv| values_equal(xv, yv)))
        }
        _ => false,
    }
}

/// Whether `value` differs from `baseline`; a missing baseline entry
/// differs from everything.
pub fn differs(value: &Value, baseline: Option<&Value>) -> bool {
    baseline.map_or(true, |b| !values_equal(value, b))
}

/// Form entries whose value differs from the baseline, in form order.
/// Keys present only in the baseline never appear.
pub fn diff(form: &FormState, baseline: &BaselineMap) -> SparseConfig {
    form.iter()
        .filter(|(key, value)| differs(value, baseline.get(key.as_str())))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Baseline overlaid with a sparse config.
pub fn merge(baseline: &BaselineMap, sparse: &SparseConfig) -> FormState {
    let mut form = baseline.clone();
    for (key, value) in sparse {
        form.insert(key.clone(), value.clone());
    }
    form
}
