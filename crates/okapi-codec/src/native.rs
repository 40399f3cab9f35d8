//! Native `.fprm` parameter format
//!
//! ```text
//! #v1
//! key.b=true          (boolean)
//! key.i=42            (integer)
//! key=string value    (anything else)
//! ```
//!
//! Newlines and carriage returns inside values are written as `$0a$` and
//! `$0d$`; nothing else is escaped.

use serde_json::{Number, Value};

use okapi_schema::ConfigMap;

use crate::error::CodecError;

/// Header line of a version-1 parameter file.
pub const HEADER: &str = "#v1";

const BOOLEAN_SUFFIX: &str = ".b";
const INTEGER_SUFFIX: &str = ".i";
const NEWLINE_TOKEN: &str = "$0a$";
const CARRIAGE_RETURN_TOKEN: &str = "$0d$";

/// Serialize a sparse config. An empty config yields an empty string.
pub fn to_native(config: &ConfigMap) -> String {
    if config.is_empty() {
        return String::new();
    }
    let mut lines = vec![HEADER.to_string()];
    for (key, value) in config {
        if value.is_null() {
            continue;
        }
        lines.push(format!("{}{}={}", key, type_suffix(value), encode_value(value)));
    }
    lines.join("\n")
}

fn type_suffix(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => BOOLEAN_SUFFIX,
        Value::Number(n) if is_integer(n) => INTEGER_SUFFIX,
        _ => "",
    }
}

fn encode_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => escape(s),
        // Arrays and objects travel as compact JSON.
        other => escape(&other.to_string()),
    }
}

/// Whether a number has no fractional part (`3` and `3.0` both count).
pub fn is_integer(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Decimal text of a number; integral floats drop the `.0`.
pub fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

pub fn escape(value: &str) -> String {
    value
        .replace('\n', NEWLINE_TOKEN)
        .replace('\r', CARRIAGE_RETURN_TOKEN)
}

pub fn unescape(value: &str) -> String {
    value
        .replace(NEWLINE_TOKEN, "\n")
        .replace(CARRIAGE_RETURN_TOKEN, "\r")
}

/// Parse a native parameter file back into an ordered mapping.
///
/// `.b` keys become booleans and `.i` keys integers; everything else is a
/// string (JSON-encoded arrays/objects stay strings). Comment and blank
/// lines are skipped.
pub fn parse_native(text: &str) -> Result<ConfigMap, CodecError> {
    let mut config = ConfigMap::new();
    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let (raw_key, raw_value) = line.split_once('=').ok_or_else(|| CodecError::InvalidLine {
            line: line_number,
            reason: "missing '='".to_string(),
        })?;

        let (key, value) = if let Some(key) = raw_key.strip_suffix(BOOLEAN_SUFFIX) {
            let flag = match raw_value.trim() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(CodecError::InvalidLine {
                        line: line_number,
                        reason: format!("'{}' is not a boolean", other),
                    })
                }
            };
            (key, Value::Bool(flag))
        } else if let Some(key) = raw_key.strip_suffix(INTEGER_SUFFIX) {
            let number: i64 = raw_value.trim().parse().map_err(|_| CodecError::InvalidLine {
                line: line_number,
                reason: format!("'{}' is not an integer", raw_value),
            })?;
            (key, Value::from(number))
        } else {
            (raw_key, Value::String(unescape(raw_value)))
        };

        if key.is_empty() {
            return Err(CodecError::InvalidLine {
                line: line_number,
                reason: "empty key".to_string(),
            });
        }
        config.insert(key.to_string(), value);
    }
    Ok(config)
}
