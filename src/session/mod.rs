//! Editing session
//!
//! One filter at one product version, optionally started from a preset.
//! The session owns the form state and recomputes everything else from it
//! on demand:
//!
//! - the sparse config is the form diffed against schema defaults;
//! - dirty keys are sparse keys whose value differs from the active
//!   baseline (defaults overlaid with the preset);
//! - a share state carries enough to rebuild the form exactly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use okapi_codec::{format_config, parse_native, CodecError, OutputFormat, Syntax, HEADER};
use okapi_schema::{FieldHint, FilterMeta, Preset, Registry, RegistryError, ResolvedFilter, SchemaDocument};

use crate::baseline::{compute_baseline, compute_defaults};
use crate::diff::diff;
use crate::dirty::{dirty_keys, dirty_lines, field_modified};
use crate::share::{restore_form, ShareState};
use crate::widgets::lists::{add_column, add_tag, remove_tag};
use crate::widgets::patterns::{add_rule, remove_rule, test_pattern, test_rules, PatternTest};
use crate::widgets::{apply_pattern, parse_input, select_widget, separator, validate_field, FieldIssue, WidgetKind};
use crate::{BaselineMap, FormState, SparseConfig};

/// Errors raised by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Preset '{config_id}' not found for filter '{filter_id}'")]
    UnknownPreset { filter_id: String, config_id: String },

    #[error("Parameter '{key}' is not a list")]
    NotAList { key: String },

    #[error("'{item}' is not a valid entry for '{key}'")]
    InvalidItem { key: String, item: String },

    #[error("Parameter '{key}' has no pattern preset '{name}'")]
    UnknownPattern { key: String, name: String },

    #[error("Failed to read {}: {message}", .path.display())]
    StateFile { path: PathBuf, message: String },
}

/// Result of opening a session.
#[derive(Debug)]
pub enum SessionView<'a> {
    Ready(Session<'a>),
    /// No schema exists for the filter at that version.
    NotFound {
        filter_id: String,
        okapi_version: String,
    },
}

/// A rendered sparse config.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub format: OutputFormat,
    pub text: String,
    pub extension: &'static str,
    pub syntax: Syntax,
    pub dirty_keys: BTreeSet<String>,
    /// Zero-based indices of lines in `text` that carry a dirty key.
    pub dirty_lines: BTreeSet<usize>,
}

#[derive(Debug, Clone)]
pub struct Session<'a> {
    registry: &'a Registry,
    filter_id: String,
    okapi_version: String,
    resolved: ResolvedFilter<'a>,
    preset: Option<&'a Preset>,
    defaults: BaselineMap,
    baseline: BaselineMap,
    form: FormState,
}

impl<'a> Session<'a> {
    /// Open `filter_id` at `okapi_version` with schema defaults loaded.
    pub fn open(registry: &'a Registry, filter_id: &str, okapi_version: &str) -> SessionView<'a> {
        match registry.resolve(filter_id, okapi_version) {
            Ok(resolved) => {
                let defaults = compute_defaults(resolved.schema);
                SessionView::Ready(Session {
                    registry,
                    filter_id: filter_id.to_string(),
                    okapi_version: okapi_version.to_string(),
                    resolved,
                    preset: None,
                    baseline: defaults.clone(),
                    form: defaults.clone(),
                    defaults,
                })
            }
            Err(_) => SessionView::NotFound {
                filter_id: filter_id.to_string(),
                okapi_version: okapi_version.to_string(),
            },
        }
    }

    /// The filter the session was opened for.
    pub fn filter_id(&self) -> &str {
        &self.filter_id
    }

    pub fn okapi_version(&self) -> &str {
        &self.okapi_version
    }

    /// Metadata of the filter whose schema is being edited. Differs from
    /// [`filter_id`](Self::filter_id) when a preset redirects the schema.
    pub fn meta(&self) -> &FilterMeta {
        &self.resolved.meta
    }

    pub fn schema(&self) -> &'a SchemaDocument {
        self.resolved.schema
    }

    pub fn preset(&self) -> Option<&'a Preset> {
        self.preset
    }

    pub fn presets(&self) -> &'a [Preset] {
        self.registry.configurations(&self.filter_id, &self.okapi_version)
    }

    pub fn defaults(&self) -> &BaselineMap {
        &self.defaults
    }

    pub fn baseline(&self) -> &BaselineMap {
        &self.baseline
    }

    pub fn form_state(&self) -> &FormState {
        &self.form
    }

    /// Load a preset, or go back to plain schema defaults with `None`.
    ///
    /// Follows the preset's `schemaRef`, recomputes the baseline and resets
    /// the form to it.
    pub fn select_preset(&mut self, config_id: Option<&str>) -> Result<(), SessionError> {
        let preset = match config_id {
            Some(id) => Some(
                self.registry
                    .preset(&self.filter_id, &self.okapi_version, id)
                    .ok_or_else(|| SessionError::UnknownPreset {
                        filter_id: self.filter_id.clone(),
                        config_id: id.to_string(),
                    })?,
            ),
            None => None,
        };
        let resolved = match preset {
            Some(p) => self
                .registry
                .resolve_for_preset(&self.filter_id, p, &self.okapi_version)?,
            None => self.registry.resolve(&self.filter_id, &self.okapi_version)?,
        };

        self.defaults = compute_defaults(resolved.schema);
        self.baseline = compute_baseline(resolved.schema, preset);
        self.form = self.baseline.clone();
        self.resolved = resolved;
        self.preset = preset;
        debug!(
            filter_id = %self.filter_id,
            schema = %self.resolved.meta.id,
            preset = config_id.unwrap_or("-"),
            baseline_keys = self.baseline.len(),
            "preset selected"
        );
        Ok(())
    }

    /// Set a form value. Keys the schema does not know are kept as they
    /// are and diff against a missing baseline entry.
    pub fn set_field(&mut self, key: &str, value: Value) {
        if self.schema().property(key).is_none() {
            debug!(filter_id = %self.resolved.meta.id, key, "keeping parameter outside the schema");
        }
        self.form.insert(key.to_string(), value);
    }

    /// Set a form value from raw text, interpreted by the property's type.
    pub fn set_field_text(&mut self, key: &str, raw: &str) {
        let value = match self.schema().property(key) {
            Some(prop) => parse_input(raw, prop),
            None => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        };
        self.set_field(key, value);
    }

    /// Set every value of an imported state. Returns the keys the schema
    /// does not know, in import order.
    pub fn import(&mut self, values: FormState) -> Vec<String> {
        let mut unknown = Vec::new();
        for (key, value) in values {
            if self.schema().property(&key).is_none() {
                warn!(filter_id = %self.resolved.meta.id, key = %key, "imported parameter is not in the schema");
                unknown.push(key.clone());
            }
            self.set_field(&key, value);
        }
        unknown
    }

    /// Widget used for `key`, when the schema declares it.
    pub fn widget(&self, key: &str) -> Option<WidgetKind> {
        self.schema().property(key).map(|prop| select_widget(key, prop))
    }

    fn text_value(&self, key: &str) -> &str {
        self.form.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    /// Add an entry to a tag list, column list or code-finder rules field.
    pub fn add_item(&mut self, key: &str, item: &str) -> Result<(), SessionError> {
        let not_a_list = || SessionError::NotAList { key: key.to_string() };
        let prop = self.schema().property(key).ok_or_else(not_a_list)?;
        let current = self.text_value(key);
        let updated = match select_widget(key, prop) {
            WidgetKind::TagList => add_tag(current, item, separator(prop)),
            WidgetKind::ColumnIndexList => {
                let column = item.trim().parse().map_err(|_| SessionError::InvalidItem {
                    key: key.to_string(),
                    item: item.to_string(),
                })?;
                add_column(current, column, separator(prop))
            }
            WidgetKind::CodeFinderRules => add_rule(current, item),
            _ => return Err(not_a_list()),
        };
        self.set_field(key, Value::String(updated));
        Ok(())
    }

    /// Remove the entry at `index` from a list field.
    pub fn remove_item(&mut self, key: &str, index: usize) -> Result<(), SessionError> {
        let not_a_list = || SessionError::NotAList { key: key.to_string() };
        let prop = self.schema().property(key).ok_or_else(not_a_list)?;
        let current = self.text_value(key);
        let updated = match select_widget(key, prop) {
            WidgetKind::TagList | WidgetKind::ColumnIndexList => remove_tag(current, index, separator(prop)),
            WidgetKind::CodeFinderRules => remove_rule(current, index),
            _ => return Err(not_a_list()),
        };
        self.set_field(key, Value::String(updated));
        Ok(())
    }

    /// Editor hint for `key`: widget, placeholder, presets, description.
    pub fn field_hint(&self, key: &str) -> Option<&FieldHint> {
        self.resolved
            .editor_hints
            .as_ref()
            .and_then(|hints| hints.fields.as_ref())
            .and_then(|fields| fields.get(key))
    }

    /// Named patterns offered for `key` (`x-presets`), in schema order.
    pub fn pattern_presets(&self, key: &str) -> Vec<(&str, &str)> {
        self.field_hint(key)
            .and_then(|hint| hint.presets.as_ref())
            .map(|presets| {
                presets
                    .iter()
                    .filter_map(|(name, pattern)| pattern.as_str().map(|p| (name.as_str(), p)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Apply the named pattern `name` to `key`: a rules field gains a rule,
    /// a regex field takes the pattern.
    pub fn apply_pattern_preset(&mut self, key: &str, name: &str) -> Result<(), SessionError> {
        let pattern = self
            .pattern_presets(key)
            .into_iter()
            .find(|(preset, _)| *preset == name)
            .map(|(_, pattern)| pattern.to_string())
            .ok_or_else(|| SessionError::UnknownPattern {
                key: key.to_string(),
                name: name.to_string(),
            })?;
        let kind = self.widget(key).unwrap_or(WidgetKind::RegexBuilder);
        let current = self.form.get(key).cloned().unwrap_or(Value::Null);
        self.set_field(key, apply_pattern(kind, &current, &pattern));
        Ok(())
    }

    /// Test the pattern (or every code-finder rule) held by `key` against
    /// `sample`. Empty when the field holds no pattern.
    pub fn test_field(&self, key: &str, sample: &str) -> Vec<PatternTest> {
        let value = self.text_value(key);
        if value.is_empty() {
            return Vec::new();
        }
        if self.widget(key) == Some(WidgetKind::CodeFinderRules) || value.starts_with(HEADER) {
            return test_rules(value, sample);
        }
        vec![PatternTest {
            index: 0,
            pattern: value.to_string(),
            matched: test_pattern(value, sample),
        }]
    }

    /// Put a field back to its baseline value, or drop it when the
    /// baseline has none.
    pub fn reset_field(&mut self, key: &str) {
        match self.baseline.get(key) {
            Some(value) => {
                self.form.insert(key.to_string(), value.clone());
            }
            None => {
                self.form.shift_remove(key);
            }
        }
    }

    /// Discard every edit.
    pub fn reset(&mut self) {
        self.form = self.baseline.clone();
    }

    /// Whether a single field differs from its schema default.
    pub fn field_modified(&self, key: &str) -> bool {
        field_modified(key, &self.form, &self.defaults)
    }

    /// Form entries that differ from schema defaults.
    pub fn sparse_config(&self) -> SparseConfig {
        diff(&self.form, &self.defaults)
    }

    /// Sparse keys whose value differs from the active baseline.
    pub fn dirty_keys(&self) -> BTreeSet<String> {
        dirty_keys(&self.sparse_config(), &self.form, &self.baseline)
    }

    /// Validation problems across the form. They never block rendering.
    pub fn issues(&self) -> Vec<FieldIssue> {
        self.form
            .iter()
            .filter_map(|(key, value)| {
                self.schema()
                    .property(key)
                    .map(|prop| validate_field(key, value, prop))
            })
            .flatten()
            .collect()
    }

    /// Render the sparse config in `format` with dirty lines marked.
    pub fn render(&self, format: OutputFormat) -> Result<Rendered, SessionError> {
        let family = self.schema().serialization_family();
        let sparse = self.sparse_config();
        let dirty = dirty_keys(&sparse, &self.form, &self.baseline);
        let text = format_config(&sparse, format, family)?;
        let syntax = format.syntax(family);
        let lines = dirty_lines(&text, syntax, &dirty);
        debug!(
            filter_id = %self.resolved.meta.id,
            format = %format,
            keys = sparse.len(),
            dirty = dirty.len(),
            "rendered config"
        );
        Ok(Rendered {
            format,
            extension: format.extension(family),
            syntax,
            text,
            dirty_keys: dirty,
            dirty_lines: lines,
        })
    }

    /// What a share link must carry to rebuild this form.
    ///
    /// The config is the sparse config plus every entry that differs from
    /// the preset baseline, so restoring over that baseline is exact.
    pub fn share_state(&self) -> ShareState {
        let mut config = self.sparse_config();
        for (key, value) in diff(&self.form, &self.baseline) {
            config.entry(key).or_insert(value);
        }
        ShareState {
            config,
            preset_id: self.preset.map(|p| p.config_id.clone()),
            okapi_version: Some(self.okapi_version.clone()),
        }
    }

    /// Move the session to another product version. The preset and form
    /// are dropped; the session is left untouched when the filter does not
    /// exist at that version.
    pub fn switch_version(&mut self, okapi_version: &str) -> Result<(), SessionError> {
        self.registry.resolve(&self.filter_id, okapi_version)?;
        let previous = std::mem::replace(&mut self.okapi_version, okapi_version.to_string());
        debug!(filter_id = %self.filter_id, from = %previous, to = okapi_version, "switching Okapi version");
        self.select_preset(None)
    }

    /// Rebuild the form from a share state, at the state's product version
    /// when it names one.
    ///
    /// An unknown preset falls back to schema defaults.
    pub fn restore(&mut self, state: &ShareState) -> Result<(), SessionError> {
        if let Some(version) = state.okapi_version.as_deref() {
            if version != self.okapi_version {
                self.switch_version(version)?;
            }
        }
        match self.select_preset(state.preset_id.as_deref()) {
            Err(SessionError::UnknownPreset { config_id, .. }) => {
                warn!(config_id = %config_id, "shared preset not found, using defaults");
                self.select_preset(None)?;
            }
            other => other?,
        }
        self.form = restore_form(&self.baseline, state);
        Ok(())
    }
}

/// Read form values from a JSON object or a native `.fprm` file.
pub fn read_state_file(path: &Path) -> Result<FormState, SessionError> {
    let fail = |message: String| SessionError::StateFile {
        path: path.to_path_buf(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
    let is_native = path.extension().is_some_and(|ext| ext == "fprm") || content.starts_with(HEADER);
    if is_native {
        return Ok(parse_native(&content)?);
    }
    match serde_json::from_str(&content).map_err(|e| fail(e.to_string()))? {
        Value::Object(values) => Ok(values),
        _ => Err(fail("expected a JSON object".to_string())),
    }
}
