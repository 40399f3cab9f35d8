//! Presets (named filter configurations).

use serde::{Deserialize, Serialize};

use crate::ConfigMap;

/// A named, pre-packaged parameter set for a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub config_id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub is_default: bool,

    /// Partial form state; `null` in the bundle means "no overrides".
    #[serde(default)]
    pub parameters: Option<ConfigMap>,

    #[serde(default)]
    pub filter_class: Option<String>,

    /// Filter id whose schema applies to this preset (e.g. a table
    /// sub-filter). Stored without the `.schema.json` suffix.
    #[serde(default, deserialize_with = "schema_ref")]
    pub schema_ref: Option<String>,
}

fn schema_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|r| r.strip_suffix(".schema.json").map(str::to_string).unwrap_or(r))
        .filter(|r| !r.is_empty()))
}

impl Preset {
    /// The preset's parameter overrides, empty when it has none.
    pub fn overrides(&self) -> ConfigMap {
        self.parameters.clone().unwrap_or_default()
    }
}
