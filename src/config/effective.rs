//! Effective settings with provenance
//!
//! The merged settings object plus the list of layers that contributed to
//! it, each file identified by path and SHA-256 digest.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use okapi_codec::OutputFormat;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Where a settings layer came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    User,
    Project,
    Cli,
}

/// A contributing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// When to color terminal output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    pub bundle: PathBuf,
    pub docs: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: OutputFormat,
    #[serde(default)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSettings {
    pub base: String,
}

/// Typed view of the merged settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Product version to use; the bundle's latest when unset.
    #[serde(default)]
    pub okapi_version: Option<String>,
    pub data: DataSettings,
    pub output: OutputSettings,
    pub link: LinkSettings,
}

/// Merged settings with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub created_at: DateTime<Utc>,

    /// The merged settings object
    pub merged: Value,

    /// Contributing layers in precedence order
    pub sources: Vec<SettingsSource>,
}

impl EffectiveSettings {
    /// Merge built-in defaults, the user file, the project file and CLI
    /// overrides. Missing files are skipped.
    pub fn build(
        user_path: Option<&Path>,
        project_path: Option<&Path>,
        cli_overrides: Option<Value>,
    ) -> Result<Self, SettingsError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        }];

        for (origin, path) in [
            (SettingsOrigin::User, user_path),
            (SettingsOrigin::Project, project_path),
        ] {
            let Some(path) = path.filter(|p| p.exists()) else {
                continue;
            };
            let (value, digest) = load_toml_file(path)?;
            debug!(path = %path.display(), ?origin, %digest, "loaded settings file");
            layers.push(value);
            sources.push(SettingsSource {
                origin,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let effective = Self {
            created_at: Utc::now(),
            merged: merge_layers(layers),
            sources,
        };
        let settings = effective.settings()?;
        if settings.link.base.trim().is_empty() {
            return Err(SettingsError::Invalid("link.base must not be empty".to_string()));
        }
        Ok(effective)
    }

    /// The typed settings.
    pub fn settings(&self) -> Result<Settings, SettingsError> {
        serde_json::from_value(self.merged.clone()).map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    /// Look up a value by dotted path, e.g. `output.format`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.merged;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// `$XDG_CONFIG_HOME/okapi-config/settings.toml`, falling back to
/// `~/.config/okapi-config/settings.toml`.
pub fn user_settings_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("okapi-config").join("settings.toml"))
}

/// Settings file looked up in the working directory.
pub fn project_settings_path() -> PathBuf {
    PathBuf::from(".okapi-config.toml")
}

/// Read a TOML file, returning its JSON form and the digest of its bytes.
fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
    let bytes = fs::read(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = hex::encode(Sha256::digest(&bytes));

    let parse_error = |message: String| SettingsError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let contents = String::from_utf8(bytes).map_err(|e| parse_error(format!("invalid UTF-8: {}", e)))?;
    let table: toml::Value = toml::from_str(&contents).map_err(|e| parse_error(e.to_string()))?;

    Ok((toml_to_json(table), digest))
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_only() {
        let effective = EffectiveSettings::build(None, None, None).unwrap();
        let settings = effective.settings().unwrap();
        assert_eq!(settings.output.format, OutputFormat::Fprm);
        assert_eq!(settings.output.color, ColorMode::Auto);
        assert_eq!(settings.okapi_version, None);
        assert_eq!(effective.sources.len(), 1);
        assert_eq!(effective.sources[0].origin, SettingsOrigin::Builtin);
    }

    #[test]
    fn test_file_layers_and_cli() {
        let mut user = NamedTempFile::new().unwrap();
        writeln!(user, "okapi_version = \"1.46.0\"").unwrap();
        writeln!(user, "[output]").unwrap();
        writeln!(user, "color = \"never\"").unwrap();

        let mut project = NamedTempFile::new().unwrap();
        writeln!(project, "[data]").unwrap();
        writeln!(project, "bundle = \"fixtures/bundle.json\"").unwrap();

        let cli = serde_json::json!({"output": {"format": "yaml"}});
        let effective = EffectiveSettings::build(Some(user.path()), Some(project.path()), Some(cli)).unwrap();
        let settings = effective.settings().unwrap();

        assert_eq!(settings.okapi_version.as_deref(), Some("1.46.0"));
        assert_eq!(settings.output.color, ColorMode::Never);
        assert_eq!(settings.output.format, OutputFormat::Yaml);
        assert_eq!(settings.data.bundle, PathBuf::from("fixtures/bundle.json"));
        assert_eq!(effective.get_str("data.docs"), Some(crate::config::DEFAULT_DOCS));

        let origins: Vec<SettingsOrigin> = effective.sources.iter().map(|s| s.origin).collect();
        assert_eq!(
            origins,
            vec![SettingsOrigin::Builtin, SettingsOrigin::User, SettingsOrigin::Project, SettingsOrigin::Cli]
        );
        assert_eq!(effective.sources[1].digest.as_ref().map(String::len), Some(64));
    }

    #[test]
    fn test_missing_file_skipped() {
        let effective =
            EffectiveSettings::build(Some(Path::new("/nonexistent/settings.toml")), None, None).unwrap();
        assert_eq!(effective.sources.len(), 1);
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output").unwrap();
        let err = EffectiveSettings::build(Some(file.path()), None, None).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_invalid_format_rejected() {
        let cli = serde_json::json!({"output": {"format": "toml"}});
        let err = EffectiveSettings::build(None, None, Some(cli)).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_to_json_lists_sources() {
        let effective = EffectiveSettings::build(None, None, None).unwrap();
        let json = effective.to_json().unwrap();
        assert!(json.contains("\"origin\": \"builtin\""));
    }
}
