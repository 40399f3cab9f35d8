//! Layered settings
//!
//! Settings are merged from four layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. User file (`~/.config/okapi-config/settings.toml`)
//! 3. Project file (`.okapi-config.toml`)
//! 4. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{BuiltinDefaults, DEFAULT_BUNDLE, DEFAULT_DOCS, DEFAULT_LINK_BASE};
pub use effective::{
    project_settings_path, user_settings_path, ColorMode, DataSettings, EffectiveSettings, LinkSettings,
    OutputSettings, Settings, SettingsError, SettingsOrigin, SettingsSource,
};
pub use merge::{deep_merge, merge_layers};
