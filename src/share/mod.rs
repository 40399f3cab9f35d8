//! Shareable links
//!
//! A link carries the sparse config as base64 of its compact JSON in the
//! `config` query parameter, plus plain `preset` and `okapi` parameters.
//! Decoding never fails loudly: a bad payload falls back to the baseline.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use serde_json::Value;
use tracing::warn;
use url::form_urlencoded;

use crate::diff::merge;
use crate::{BaselineMap, FormState, SparseConfig};

pub const CONFIG_PARAM: &str = "config";
pub const PRESET_PARAM: &str = "preset";
pub const VERSION_PARAM: &str = "okapi";

/// Accepts payloads with or without `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why a `config` payload could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Everything a link carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareState {
    pub config: SparseConfig,
    pub preset_id: Option<String>,
    pub okapi_version: Option<String>,
}

/// Base64 of the compact JSON of `config`.
pub fn encode_config(config: &SparseConfig) -> String {
    let json = Value::Object(config.clone()).to_string();
    base64::Engine::encode(&STANDARD, json.as_bytes())
}

/// Decode a `config` payload, reporting why it failed.
pub fn try_decode_config(encoded: &str) -> Result<SparseConfig, ShareError> {
    // Unencoded links put raw '+' in the query, which form decoding turns
    // into spaces.
    let cleaned: String = encoded
        .trim()
        .chars()
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();
    let bytes = base64::Engine::decode(&LENIENT, cleaned.as_bytes())?;
    let text = String::from_utf8(bytes)?;
    match serde_json::from_str::<Value>(&text)? {
        Value::Object(config) => Ok(config),
        _ => Err(ShareError::NotAnObject),
    }
}

/// Decode a `config` payload; `None` (logged) when it is malformed.
pub fn decode_config(encoded: &str) -> Option<SparseConfig> {
    match try_decode_config(encoded) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(error = %err, "ignoring malformed shared config");
            None
        }
    }
}

/// Query string for a share state (without the leading `?`).
///
/// An empty config is left out, as is the product version when it is the
/// latest one.
pub fn build_query(state: &ShareState, latest_version: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if !state.config.is_empty() {
        query.append_pair(CONFIG_PARAM, &encode_config(&state.config));
    }
    if let Some(preset) = state.preset_id.as_deref() {
        query.append_pair(PRESET_PARAM, preset);
    }
    if let Some(version) = state.okapi_version.as_deref() {
        if Some(version) != latest_version {
            query.append_pair(VERSION_PARAM, version);
        }
    }
    query.finish()
}

/// Full link: `base` plus the share query, when there is one.
pub fn build_link(base: &str, state: &ShareState, latest_version: Option<&str>) -> String {
    let query = build_query(state, latest_version);
    if query.is_empty() {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base, separator, query)
}

/// Read a share state from a query string or a whole link.
///
/// Unknown parameters are ignored; a malformed `config` yields an empty
/// config.
pub fn parse_query(input: &str) -> ShareState {
    let query = input.split_once('?').map_or(input, |(_, q)| q);
    let mut state = ShareState::default();
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        match name.as_ref() {
            CONFIG_PARAM => state.config = decode_config(&value).unwrap_or_default(),
            PRESET_PARAM if !value.is_empty() => state.preset_id = Some(value.into_owned()),
            VERSION_PARAM if !value.is_empty() => state.okapi_version = Some(value.into_owned()),
            _ => {}
        }
    }
    state
}

/// Form state restored from a link: the baseline overlaid with its config.
pub fn restore_form(baseline: &BaselineMap, state: &ShareState) -> FormState {
    merge(baseline, &state.config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> SparseConfig {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_encode_matches_plain_base64_of_json() {
        let config = map(json!({"a": true}));
        assert_eq!(encode_config(&config), "eyJhIjp0cnVlfQ==");
        assert_eq!(decode_config("eyJhIjp0cnVlfQ==").unwrap(), config);
        assert_eq!(decode_config("eyJhIjp0cnVlfQ").unwrap(), config);
    }

    #[test]
    fn test_malformed_payloads_fail_soft() {
        assert!(decode_config("%%%not base64").is_none());
        // "hello" is valid base64 of non-JSON bytes.
        assert!(decode_config("aGVsbG8=").is_none());
        // "[1]" decodes to JSON that is not an object.
        assert!(matches!(try_decode_config("WzFd"), Err(ShareError::NotAnObject)));
    }

    #[test]
    fn test_link_round_trip() {
        let state = ShareState {
            config: map(json!({"pattern": "a+b/c", "n": 3})),
            preset_id: Some("okf_table_csv".to_string()),
            okapi_version: Some("1.46.0".to_string()),
        };
        let link = build_link("https://example.org/#/configure/okf_table", &state, Some("1.47.0"));
        assert!(link.starts_with("https://example.org/#/configure/okf_table?config="));
        assert_eq!(parse_query(&link), state);
    }

    #[test]
    fn test_latest_version_and_empty_config_omitted() {
        let state = ShareState {
            config: SparseConfig::new(),
            preset_id: None,
            okapi_version: Some("1.47.0".to_string()),
        };
        assert_eq!(build_link("https://x/", &state, Some("1.47.0")), "https://x/");
    }

    #[test]
    fn test_raw_plus_in_query() {
        // {"k":"~~>"} encodes with a '+' that an unencoded link keeps raw.
        let config = map(json!({"k": "~~>"}));
        let encoded = encode_config(&config);
        assert!(encoded.contains('+'));
        let state = parse_query(&format!("config={}", encoded));
        assert_eq!(state.config, config);
    }

    #[test]
    fn test_restore_form_falls_back_to_baseline() {
        let baseline = map(json!({"x": 1, "y": "a"}));
        let state = parse_query("config=!!garbage!!&preset=p");
        assert_eq!(state.preset_id.as_deref(), Some("p"));
        assert_eq!(restore_form(&baseline, &state), baseline);

        let state = parse_query(&format!("config={}", encode_config(&map(json!({"x": 2})))));
        assert_eq!(Value::Object(restore_form(&baseline, &state)), json!({"x": 2, "y": "a"}));
    }
}
