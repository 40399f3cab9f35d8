//! The precomputed data bundle produced by the offline schema import.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::preset::Preset;
use crate::schema::SchemaDocument;

/// One schema version of a filter and the product versions it ships with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterVersionInfo {
    pub version: u32,
    #[serde(default)]
    pub okapi_versions: Vec<String>,
    #[serde(default)]
    pub introduced_in_okapi: Option<String>,
}

/// All known schema versions of one filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInfo {
    #[serde(default)]
    pub versions: Vec<FilterVersionInfo>,
}

/// Presets keyed by filter id.
pub type PresetsByFilter = BTreeMap<String, Vec<Preset>>;

/// The whole bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,

    /// Product versions, ascending.
    #[serde(default)]
    pub okapi_versions: Vec<String>,

    #[serde(default)]
    pub filters: BTreeMap<String, FilterInfo>,

    /// Composite schemas keyed by `<filterId>.v<N>`.
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaDocument>,

    /// Presets keyed by product version, then filter id.
    #[serde(default)]
    pub configurations: BTreeMap<String, PresetsByFilter>,
}

impl Bundle {
    /// Parse a bundle from JSON text.
    pub fn from_json(content: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read and parse a bundle file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Err(RegistryError::BundleNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Key under which the schema for `filter_id` at `schema_version` is stored.
    pub fn schema_key(filter_id: &str, schema_version: u32) -> String {
        format!("{}.v{}", filter_id, schema_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "generatedAt": "2025-11-02T10:15:00Z",
        "okapiVersions": ["1.46.0", "1.47.0"],
        "filters": {
            "okf_json": {"versions": [{"version": 1, "okapiVersions": ["1.46.0"], "introducedInOkapi": "1.46.0"}]}
        },
        "schemas": {"okf_json.v1": {"title": "JSON Filter", "properties": {}}},
        "configurations": {}
    }"#;

    #[test]
    fn test_parse_bundle() {
        let bundle = Bundle::from_json(SAMPLE).unwrap();
        assert_eq!(bundle.okapi_versions, vec!["1.46.0", "1.47.0"]);
        assert!(bundle.generated_at.is_some());
        assert_eq!(bundle.filters["okf_json"].versions[0].version, 1);
        assert!(bundle.schemas.contains_key("okf_json.v1"));
    }

    #[test]
    fn test_schema_key() {
        assert_eq!(Bundle::schema_key("okf_json", 4), "okf_json.v4");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let bundle = Bundle::load(file.path()).unwrap();
        assert_eq!(bundle.schemas.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Bundle::load(Path::new("/nonexistent/bundle.json")).unwrap_err();
        assert!(matches!(err, RegistryError::BundleNotFound(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Bundle::from_json("{"), Err(RegistryError::Parse(_))));
    }
}
