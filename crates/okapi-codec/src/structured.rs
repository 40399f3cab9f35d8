//! YAML and JSON renderings of a sparse config.

use serde_json::Value;

use okapi_schema::ConfigMap;

use crate::error::CodecError;

/// Block-style YAML in key insertion order. Empty config → empty string.
///
/// The emitter never produces anchors or aliases, so repeated sub-values are
/// written out in full. Block sequences sit at their parent key's column
/// (`list:\n- a`); YAML readers treat that the same as the indented form.
pub fn to_yaml(config: &ConfigMap) -> Result<String, CodecError> {
    if config.is_empty() {
        return Ok(String::new());
    }
    let text = serde_yaml::to_string(config)?;
    Ok(text.trim_end().to_string())
}

/// Pretty-printed JSON with two-space indent; `{}` when empty.
pub fn to_json(config: &ConfigMap) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(&Value::Object(config.clone()))?)
}
