//! Default/baseline resolution
//!
//! The baseline is the value set "changed" is measured against: schema
//! defaults, or schema defaults overlaid with a preset's parameters.

use serde_json::Value;

use okapi_schema::{Preset, SchemaDocument, SchemaProperty};

use crate::BaselineMap;

/// Schema defaults, in property order.
///
/// Explicit `default` wins; otherwise a zero value is inferred from the
/// declared type (`boolean` → false, `string` → "", `integer`/`number` → 0).
/// Arrays, objects and union-typed properties without a default stay absent.
pub fn compute_defaults(schema: &SchemaDocument) -> BaselineMap {
    let mut defaults = BaselineMap::new();
    for (key, prop) in &schema.properties {
        if let Some(value) = default_for(prop) {
            defaults.insert(key.clone(), value);
        }
    }
    defaults
}

fn default_for(prop: &SchemaProperty) -> Option<Value> {
    if let Some(value) = &prop.default {
        return Some(value.clone());
    }
    match prop.type_name()? {
        "boolean" => Some(Value::Bool(false)),
        "string" => Some(Value::String(String::new())),
        "integer" | "number" => Some(Value::from(0)),
        _ => None,
    }
}

/// Baseline for dirty detection: defaults overlaid with the preset's
/// parameters, when a preset is loaded.
pub fn compute_baseline(schema: &SchemaDocument, preset: Option<&Preset>) -> BaselineMap {
    let mut baseline = compute_defaults(schema);
    if let Some(preset) = preset {
        for (key, value) in preset.overrides() {
            baseline.insert(key, value);
        }
    }
    baseline
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> SchemaDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_inferred_defaults() {
        let doc = schema(json!({"properties": {
            "flag": {"type": "boolean"},
            "name": {"type": "string"},
            "count": {"type": "integer"},
            "ratio": {"type": "number"},
            "list": {"type": "array"},
            "obj": {"type": "object"},
            "either": {"type": ["string", "null"]},
            "untyped": {}
        }}));
        let defaults = compute_defaults(&doc);
        assert_eq!(
            Value::Object(defaults),
            json!({"flag": false, "name": "", "count": 0, "ratio": 0})
        );
    }

    #[test]
    fn test_explicit_defaults_win() {
        let doc = schema(json!({"properties": {
            "flag": {"type": "boolean", "default": true},
            "list": {"type": "array", "default": ["a"]},
            "nullable": {"type": "string", "default": null}
        }}));
        let defaults = compute_defaults(&doc);
        assert_eq!(defaults["flag"], true);
        assert_eq!(defaults["list"], json!(["a"]));
        assert_eq!(defaults["nullable"], Value::Null);
    }

    #[test]
    fn test_preset_overlay() {
        let doc = schema(json!({"properties": {
            "x": {"type": "integer", "default": 0},
            "y": {"type": "string", "default": "keep"}
        }}));
        let preset: Preset = serde_json::from_value(json!({
            "configId": "p", "name": "P", "parameters": {"x": 5, "extra": true}
        }))
        .unwrap();
        let baseline = compute_baseline(&doc, Some(&preset));
        assert_eq!(Value::Object(baseline), json!({"x": 5, "y": "keep", "extra": true}));
    }

    #[test]
    fn test_preset_without_parameters() {
        let doc = schema(json!({"properties": {"x": {"type": "integer", "default": 1}}}));
        let preset: Preset =
            serde_json::from_value(json!({"configId": "p", "name": "P", "parameters": null})).unwrap();
        assert_eq!(compute_baseline(&doc, Some(&preset)), compute_defaults(&doc));
        assert_eq!(compute_baseline(&doc, None), compute_defaults(&doc));
    }
}
