//! Registry error types.

use std::path::PathBuf;

/// Errors raised while loading the bundle or resolving a filter.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse bundle JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Bundle file not found: {0}")]
    BundleNotFound(PathBuf),

    /// The filter has no schema for the requested product version.
    #[error("Filter '{filter_id}' not found for Okapi {okapi_version}")]
    NotFound {
        filter_id: String,
        okapi_version: String,
    },
}

impl RegistryError {
    /// Whether this is the not-found signal rather than a load failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
