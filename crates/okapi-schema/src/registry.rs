//! Schema registry
//!
//! Answers "which schema applies to filter X at Okapi version Y", and
//! serves presets and search over the loaded bundle. The registry is built
//! once and never mutated, so it can be shared by reference freely.

use std::path::Path;

use tracing::debug;

use crate::bundle::{Bundle, FilterVersionInfo};
use crate::error::RegistryError;
use crate::meta::{EditorHints, FilterMeta};
use crate::preset::Preset;
use crate::schema::SchemaDocument;

/// A filter resolved for one product version.
#[derive(Debug, Clone)]
pub struct ResolvedFilter<'a> {
    pub okapi_version: String,
    pub meta: FilterMeta,
    pub schema: &'a SchemaDocument,
    pub editor_hints: Option<EditorHints>,
}

impl ResolvedFilter<'_> {
    pub fn filter_id(&self) -> &str {
        &self.meta.id
    }
}

/// Read-only view over a [`Bundle`].
#[derive(Debug, Clone, Default)]
pub struct Registry {
    bundle: Bundle,
    filter_ids: Vec<String>,
}

impl Registry {
    pub fn new(bundle: Bundle) -> Self {
        // BTreeMap keys are already sorted.
        let filter_ids = bundle.filters.keys().cloned().collect();
        Self { bundle, filter_ids }
    }

    /// Parse a registry from bundle JSON.
    pub fn from_json(content: &str) -> Result<Self, RegistryError> {
        Bundle::from_json(content).map(Self::new)
    }

    /// Load a registry from a bundle file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let bundle = Bundle::load(path)?;
        debug!(
            path = %path.display(),
            filters = bundle.filters.len(),
            schemas = bundle.schemas.len(),
            "loaded schema bundle"
        );
        Ok(Self::new(bundle))
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    /// All product versions, ascending.
    pub fn okapi_versions(&self) -> &[String] {
        &self.bundle.okapi_versions
    }

    /// The newest product version, if the bundle lists any.
    pub fn latest_version(&self) -> Option<&str> {
        self.bundle.okapi_versions.last().map(String::as_str)
    }

    pub fn has_version(&self, okapi_version: &str) -> bool {
        self.bundle.okapi_versions.iter().any(|v| v == okapi_version)
    }

    /// Every schema version known for a filter.
    pub fn filter_versions(&self, filter_id: &str) -> &[FilterVersionInfo] {
        self.bundle
            .filters
            .get(filter_id)
            .map(|info| info.versions.as_slice())
            .unwrap_or_default()
    }

    /// Schema version of `filter_id` at `okapi_version`.
    ///
    /// When several schema versions list the same product version (a stale
    /// and a regenerated one), the highest number wins.
    pub fn schema_version_for(&self, filter_id: &str, okapi_version: &str) -> Option<u32> {
        self.filter_versions(filter_id)
            .iter()
            .filter(|v| v.okapi_versions.iter().any(|o| o == okapi_version))
            .map(|v| v.version)
            .max()
    }

    pub fn composite_schema(&self, filter_id: &str, schema_version: u32) -> Option<&SchemaDocument> {
        self.bundle
            .schemas
            .get(&Bundle::schema_key(filter_id, schema_version))
    }

    /// Resolve a filter for a product version.
    pub fn resolve(&self, filter_id: &str, okapi_version: &str) -> Result<ResolvedFilter<'_>, RegistryError> {
        let not_found = || RegistryError::NotFound {
            filter_id: filter_id.to_string(),
            okapi_version: okapi_version.to_string(),
        };

        let version = self
            .schema_version_for(filter_id, okapi_version)
            .ok_or_else(not_found)?;
        let schema = self
            .composite_schema(filter_id, version)
            .ok_or_else(not_found)?;

        debug!(filter_id, okapi_version, schema_version = version, "resolved schema");
        Ok(ResolvedFilter {
            okapi_version: okapi_version.to_string(),
            meta: FilterMeta::from_schema(filter_id, schema, version),
            schema,
            editor_hints: EditorHints::from_schema(schema),
        })
    }

    /// Resolve the schema a preset is edited against: the preset's
    /// `schemaRef` filter when set, the parent filter otherwise.
    pub fn resolve_for_preset(
        &self,
        parent_filter_id: &str,
        preset: &Preset,
        okapi_version: &str,
    ) -> Result<ResolvedFilter<'_>, RegistryError> {
        match preset.schema_ref.as_deref() {
            Some(target) => {
                debug!(parent_filter_id, schema_ref = target, config_id = %preset.config_id, "following schemaRef");
                self.resolve(target, okapi_version)
            }
            None => self.resolve(parent_filter_id, okapi_version),
        }
    }

    /// Filter ids available at a product version.
    pub fn filter_ids_for(&self, okapi_version: &str) -> Vec<&str> {
        self.filter_ids
            .iter()
            .filter(|id| self.schema_version_for(id, okapi_version).is_some())
            .map(String::as_str)
            .collect()
    }

    /// All filters resolvable at a product version.
    pub fn filters_for(&self, okapi_version: &str) -> Vec<ResolvedFilter<'_>> {
        self.filter_ids_for(okapi_version)
            .into_iter()
            .filter_map(|id| self.resolve(id, okapi_version).ok())
            .collect()
    }

    /// Case-insensitive search; an empty query returns every filter.
    pub fn search(&self, query: &str, okapi_version: &str) -> Vec<ResolvedFilter<'_>> {
        let query = query.to_lowercase();
        self.filters_for(okapi_version)
            .into_iter()
            .filter(|f| query.is_empty() || f.meta.matches(&query))
            .collect()
    }

    /// Presets of a filter at a product version.
    pub fn configurations(&self, filter_id: &str, okapi_version: &str) -> &[Preset] {
        self.bundle
            .configurations
            .get(okapi_version)
            .and_then(|by_filter| by_filter.get(filter_id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn preset(&self, filter_id: &str, okapi_version: &str, config_id: &str) -> Option<&Preset> {
        self.configurations(filter_id, okapi_version)
            .iter()
            .find(|p| p.config_id == config_id)
    }

    /// The preset flagged `isDefault`, if any.
    pub fn default_preset(&self, filter_id: &str, okapi_version: &str) -> Option<&Preset> {
        self.configurations(filter_id, okapi_version)
            .iter()
            .find(|p| p.is_default)
    }
}
