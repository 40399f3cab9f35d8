//! Output format selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use okapi_schema::{ConfigMap, SerializationFamily};

use crate::error::CodecError;
use crate::native::to_native;
use crate::structured::{to_json, to_yaml};

/// Export formats offered to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    /// The filter's native parameter file.
    #[default]
    Fprm,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Json, Self::Yaml, Self::Fprm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Fprm => "fprm",
        }
    }

    /// Text syntax actually produced for a filter of the given family.
    pub fn syntax(&self, family: SerializationFamily) -> Syntax {
        match (self, family) {
            (Self::Json, _) => Syntax::Json,
            (Self::Yaml, _) | (Self::Fprm, SerializationFamily::Yaml) => Syntax::Yaml,
            (Self::Fprm, SerializationFamily::StringParameters) => Syntax::Native,
        }
    }

    /// Suggested file extension.
    pub fn extension(&self, family: SerializationFamily) -> &'static str {
        match (self, family) {
            (Self::Json, _) => ".json",
            (Self::Yaml, _) | (Self::Fprm, SerializationFamily::Yaml) => ".yml",
            (Self::Fprm, SerializationFamily::StringParameters) => ".fprm",
        }
    }

    /// Label shown in format pickers.
    pub fn label(&self, family: SerializationFamily) -> &'static str {
        match (self, family) {
            (Self::Json, _) => "JSON",
            (Self::Yaml, _) => "YAML",
            (Self::Fprm, SerializationFamily::Yaml) => ".fprm (YAML)",
            (Self::Fprm, SerializationFamily::StringParameters) => ".fprm",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "fprm" | "native" => Ok(Self::Fprm),
            _ => Err(CodecError::UnknownFormat(s.to_string())),
        }
    }
}

/// Concrete text syntax of rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    Native,
    Json,
    Yaml,
}

/// A selectable output format with its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatOption {
    pub format: OutputFormat,
    pub label: &'static str,
}

/// The format options for a filter of the given family.
pub fn output_formats(family: SerializationFamily) -> Vec<FormatOption> {
    OutputFormat::ALL
        .iter()
        .map(|format| FormatOption {
            format: *format,
            label: format.label(family),
        })
        .collect()
}

/// Render a sparse config. `Fprm` follows the filter's native family, so
/// YAML-based filters get YAML bytes.
pub fn format_config(
    config: &ConfigMap,
    format: OutputFormat,
    family: SerializationFamily,
) -> Result<String, CodecError> {
    match format.syntax(family) {
        Syntax::Json => to_json(config),
        Syntax::Yaml => to_yaml(config),
        Syntax::Native => Ok(to_native(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ConfigMap {
        match json!({"extractAll": true, "maxDepth": 2}) {
            serde_json::Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_fprm_follows_family() {
        let config = sample();
        let native = format_config(&config, OutputFormat::Fprm, SerializationFamily::StringParameters).unwrap();
        assert!(native.starts_with("#v1\n"));

        let yaml = format_config(&config, OutputFormat::Fprm, SerializationFamily::Yaml).unwrap();
        assert_eq!(yaml, "extractAll: true\nmaxDepth: 2");
    }

    #[test]
    fn test_json_and_yaml_ignore_family() {
        let config = sample();
        for family in [SerializationFamily::StringParameters, SerializationFamily::Yaml] {
            assert!(format_config(&config, OutputFormat::Json, family).unwrap().starts_with('{'));
            assert!(format_config(&config, OutputFormat::Yaml, family).unwrap().starts_with("extractAll"));
        }
    }

    #[test]
    fn test_extensions() {
        use SerializationFamily::*;
        assert_eq!(OutputFormat::Json.extension(StringParameters), ".json");
        assert_eq!(OutputFormat::Yaml.extension(StringParameters), ".yml");
        assert_eq!(OutputFormat::Fprm.extension(StringParameters), ".fprm");
        assert_eq!(OutputFormat::Fprm.extension(Yaml), ".yml");
    }

    #[test]
    fn test_labels() {
        let labels: Vec<&str> = output_formats(SerializationFamily::Yaml)
            .iter()
            .map(|o| o.label)
            .collect();
        assert_eq!(labels, vec!["JSON", "YAML", ".fprm (YAML)"]);
        assert_eq!(OutputFormat::Fprm.label(SerializationFamily::StringParameters), ".fprm");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("fprm".parse::<OutputFormat>().unwrap(), OutputFormat::Fprm);
        assert!("toml".parse::<OutputFormat>().is_err());
    }
}
