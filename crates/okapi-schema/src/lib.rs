//! Okapi filter schemas.
//!
//! Types for the precomputed schema bundle (composite schemas, version
//! mappings and presets) and the [`Registry`] that resolves a filter id and
//! Okapi version to the schema that applies.

pub mod bundle;
pub mod error;
pub mod meta;
pub mod preset;
pub mod registry;
pub mod schema;

pub use bundle::{Bundle, FilterInfo, FilterVersionInfo};
pub use error::RegistryError;
pub use meta::{EditorHints, FieldHint, FilterMeta};
pub use preset::Preset;
pub use registry::{Registry, ResolvedFilter};
pub use schema::{PropertyType, SchemaDocument, SchemaGroup, SchemaProperty, SerializationFamily, XFilterMeta};

/// Ordered field → value mapping used for form state, baselines and
/// sparse configurations.
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;
