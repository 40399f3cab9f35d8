//! Codec error types.

/// Errors raised while rendering or parsing configuration text.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },

    #[error("Unknown output format '{0}' (expected json, yaml or fprm)")]
    UnknownFormat(String),
}
