//! Built-in settings (layer 1)

use serde::{Deserialize, Serialize};

/// Data bundle looked up when no settings file names one.
pub const DEFAULT_BUNDLE: &str = "data/okapi-bundle.json";

/// Documentation bundle looked up when no settings file names one.
pub const DEFAULT_DOCS: &str = "data/filter-docs.json";

/// Base URL that share links are built on.
pub const DEFAULT_LINK_BASE: &str = "http://localhost:5173/#/configure";

/// Hardcoded values every other layer overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    pub bundle: String,
    pub docs: String,
    pub output_format: String,
    pub color: String,
    pub link_base: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            bundle: DEFAULT_BUNDLE.to_string(),
            docs: DEFAULT_DOCS.to_string(),
            output_format: "fprm".to_string(),
            color: "auto".to_string(),
            link_base: DEFAULT_LINK_BASE.to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Same shape as a settings file, for merging.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "okapi_version": null,
            "data": {
                "bundle": self.bundle,
                "docs": self.docs
            },
            "output": {
                "format": self.output_format,
                "color": self.color
            },
            "link": {
                "base": self.link_base
            }
        })
    }
}
