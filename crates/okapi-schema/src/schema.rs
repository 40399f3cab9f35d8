//! Composite schema documents.
//!
//! A composite schema is the JSON Schema for one filter at one schema
//! version, with groups and widget hints already merged in by the import
//! step. Everything here is read-only once deserialized.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ConfigMap;

/// Declared `type` of a property: either a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyType {
    Single(String),
    Union(Vec<String>),
}

impl PropertyType {
    /// The type name when exactly one type is declared.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name.as_str()),
            Self::Union(_) => None,
        }
    }

    /// Whether `name` is one of the declared types.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            Self::Single(t) => t == name,
            Self::Union(types) => types.iter().any(|t| t == name),
        }
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)` so that a present-but-null
/// default is distinguishable from an absent one.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// One entry of a schema's `properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyType>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,

    /// Nested object properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaProperty>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    /// Widget hint (`x-widget`).
    #[serde(rename = "x-widget", default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,

    /// Named value presets offered by rich widgets (`x-presets`).
    #[serde(rename = "x-presets", default, skip_serializing_if = "Option::is_none")]
    pub presets: Option<ConfigMap>,

    #[serde(rename = "x-placeholder", default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Display labels matching `enum` positionally (`x-enumLabels`).
    #[serde(rename = "x-enumLabels", default, skip_serializing_if = "Option::is_none")]
    pub enum_labels: Option<Vec<String>>,

    /// Any other keyword, kept verbatim.
    #[serde(flatten)]
    pub extra: ConfigMap,
}

impl SchemaProperty {
    /// The single declared type name, if any.
    pub fn type_name(&self) -> Option<&str> {
        self.kind.as_ref().and_then(PropertyType::as_single)
    }

    /// Non-empty `enum` values.
    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enumeration.as_deref().filter(|values| !values.is_empty())
    }
}

/// An ordered group of fields (`x-groups`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaGroup {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// How a filter persists its parameters natively.
///
/// Anything other than `yaml` is read as string parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SerializationFamily {
    /// YAML parameter files.
    Yaml,
    /// Line-oriented `key.<suffix>=value` parameter files.
    #[default]
    #[serde(other)]
    StringParameters,
}

/// Filter metadata embedded in the schema (`x-filter`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XFilterMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub mime_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization_format: Option<SerializationFamily>,
}

/// A composite schema for one filter at one schema version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(rename = "$schema", default)]
    pub schema: String,

    #[serde(rename = "$id", default)]
    pub id: String,

    #[serde(rename = "$version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub properties: IndexMap<String, SchemaProperty>,

    #[serde(rename = "additionalProperties", default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,

    #[serde(rename = "x-filter", default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<XFilterMeta>,

    #[serde(rename = "x-groups", default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<SchemaGroup>>,

    #[serde(rename = "x-schemaVersion", default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,

    #[serde(rename = "x-baseVersion", default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<u32>,

    #[serde(rename = "x-baseHash", default, skip_serializing_if = "Option::is_none")]
    pub base_hash: Option<String>,

    #[serde(rename = "x-compositeHash", default, skip_serializing_if = "Option::is_none")]
    pub composite_hash: Option<String>,

    #[serde(rename = "x-introducedInOkapi", default, skip_serializing_if = "Option::is_none")]
    pub introduced_in_okapi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<ConfigMap>,

    #[serde(rename = "$defs", default, skip_serializing_if = "Option::is_none")]
    pub defs: Option<ConfigMap>,
}

impl SchemaDocument {
    /// Look up a top-level property.
    pub fn property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Groups declared by the schema, or an empty slice.
    pub fn groups(&self) -> &[SchemaGroup] {
        self.groups.as_deref().unwrap_or_default()
    }

    /// Native serialization family; string parameters unless declared.
    pub fn serialization_family(&self) -> SerializationFamily {
        self.filter
            .as_ref()
            .and_then(|f| f.serialization_format)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_order_is_preserved() {
        let doc: SchemaDocument = serde_json::from_value(json!({
            "title": "JSON Filter",
            "properties": {
                "zeta": {"type": "boolean"},
                "alpha": {"type": "string"},
                "mid": {"type": "integer"}
            }
        }))
        .unwrap();
        let keys: Vec<&str> = doc.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_null_default_is_present() {
        let prop: SchemaProperty =
            serde_json::from_value(json!({"type": "string", "default": null})).unwrap();
        assert_eq!(prop.default, Some(Value::Null));

        let prop: SchemaProperty = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert_eq!(prop.default, None);
    }

    #[test]
    fn test_union_type() {
        let prop: SchemaProperty =
            serde_json::from_value(json!({"type": ["string", "null"]})).unwrap();
        assert_eq!(prop.type_name(), None);
        assert!(prop.kind.as_ref().unwrap().includes("null"));
    }

    #[test]
    fn test_widget_hints_and_extras() {
        let prop: SchemaProperty = serde_json::from_value(json!({
            "type": "string",
            "x-widget": "regexBuilder",
            "x-placeholder": "pattern",
            "x-okapiFormat": "regex"
        }))
        .unwrap();
        assert_eq!(prop.widget.as_deref(), Some("regexBuilder"));
        assert_eq!(prop.placeholder.as_deref(), Some("pattern"));
        assert_eq!(prop.extra["x-okapiFormat"], "regex");
    }

    #[test]
    fn test_serialization_family_defaults_to_string_parameters() {
        let doc = SchemaDocument::default();
        assert_eq!(doc.serialization_family(), SerializationFamily::StringParameters);

        let doc: SchemaDocument = serde_json::from_value(json!({
            "x-filter": {"id": "okf_markdown", "serializationFormat": "yaml"}
        }))
        .unwrap();
        assert_eq!(doc.serialization_family(), SerializationFamily::Yaml);
    }

    #[test]
    fn test_unknown_serialization_format_reads_as_string_parameters() {
        let doc: SchemaDocument = serde_json::from_value(json!({
            "x-filter": {"id": "okf_xmlstream", "serializationFormat": "xml"}
        }))
        .unwrap();
        assert_eq!(doc.serialization_family(), SerializationFamily::StringParameters);
    }
}
