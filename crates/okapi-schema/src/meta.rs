//! Display metadata and editor hints derived from composite schemas.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{SchemaDocument, SchemaGroup};
use crate::ConfigMap;

/// Display names for filters whose upstream title is generic.
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("okf_baseplaintext", "Base Plain Text"),
    ("okf_basetable", "Base Table"),
    ("okf_commaseparatedvalues", "Comma Separated Values (CSV)"),
    ("okf_fixedwidthcolumns", "Fixed Width Columns"),
    ("okf_paraplaintext", "Paragraph Plain Text"),
    ("okf_plaintext", "Plain Text"),
    ("okf_splicedlines", "Spliced Lines"),
    ("okf_tabseparatedvalues", "Tab Separated Values (TSV)"),
];

/// Titles shared by many filters.
const GENERIC_TITLES: &[&str] = &["", "Plain Text", "Plain Text (BETA)"];

/// Summary of a filter, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMeta {
    pub id: String,
    pub name: String,
    pub class: String,
    pub mime_type: String,
    pub extensions: Vec<String>,
    pub description: String,
    pub schema_version: u32,
}

impl FilterMeta {
    /// Build metadata for `filter_id` from its composite schema.
    pub fn from_schema(filter_id: &str, schema: &SchemaDocument, schema_version: u32) -> Self {
        let mut name = schema.title.clone();
        for _ in 0..2 {
            if let Some(stripped) = name.strip_suffix(" Filter") {
                name = stripped.to_string();
            }
        }
        if GENERIC_TITLES.contains(&name.as_str()) {
            name = display_name(filter_id).unwrap_or(filter_id).to_string();
        }

        let x_filter = schema.filter.clone().unwrap_or_default();
        Self {
            id: filter_id.to_string(),
            name,
            class: x_filter.class,
            mime_type: x_filter.mime_types.first().cloned().unwrap_or_default(),
            extensions: x_filter.extensions,
            description: schema.description.clone(),
            schema_version,
        }
    }

    /// Case-insensitive match against id, name, MIME type, description and extensions.
    /// `query` must already be lowercase.
    pub fn matches(&self, query: &str) -> bool {
        self.id.to_lowercase().contains(query)
            || self.name.to_lowercase().contains(query)
            || self.mime_type.to_lowercase().contains(query)
            || self.description.to_lowercase().contains(query)
            || self
                .extensions
                .iter()
                .any(|ext| ext.to_lowercase().contains(query))
    }
}

fn display_name(filter_id: &str) -> Option<&'static str> {
    DISPLAY_NAMES
        .iter()
        .find(|(id, _)| *id == filter_id)
        .map(|(_, name)| *name)
}

/// Per-field editor hint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets: Option<ConfigMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldHint {
    fn is_empty(&self) -> bool {
        self.widget.is_none()
            && self.placeholder.is_none()
            && self.presets.is_none()
            && self.description.is_none()
    }
}

/// Groups and field hints for the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<SchemaGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, FieldHint>>,
}

impl EditorHints {
    /// Extract hints from a composite schema. `None` when the schema has
    /// neither groups nor any hinted field.
    pub fn from_schema(schema: &SchemaDocument) -> Option<Self> {
        let mut fields = IndexMap::new();
        for (key, prop) in &schema.properties {
            let hint = FieldHint {
                widget: prop.widget.clone().filter(|w| !w.is_empty()),
                placeholder: prop.placeholder.clone().filter(|p| !p.is_empty()),
                presets: prop.presets.clone(),
                description: prop.description.clone().filter(|d| !d.is_empty()),
            };
            if !hint.is_empty() {
                fields.insert(key.clone(), hint);
            }
        }

        if schema.groups.is_none() && fields.is_empty() {
            return None;
        }
        Some(Self {
            groups: schema.groups.clone(),
            fields: (!fields.is_empty()).then_some(fields),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> SchemaDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_title_suffix_stripped() {
        let doc = schema(json!({
            "title": "JSON Filter",
            "description": "Extracts JSON strings",
            "x-filter": {
                "id": "okf_json",
                "class": "net.sf.okapi.filters.json.JSONFilter",
                "extensions": [".json"],
                "mimeTypes": ["application/json", "text/json"]
            }
        }));
        let meta = FilterMeta::from_schema("okf_json", &doc, 3);
        assert_eq!(meta.name, "JSON");
        assert_eq!(meta.mime_type, "application/json");
        assert_eq!(meta.extensions, vec![".json"]);
        assert_eq!(meta.schema_version, 3);
    }

    #[test]
    fn test_double_filter_suffix() {
        let doc = schema(json!({"title": "Doxygen Filter Filter"}));
        assert_eq!(FilterMeta::from_schema("okf_doxygen", &doc, 1).name, "Doxygen");
    }

    #[test]
    fn test_generic_title_uses_display_name() {
        let doc = schema(json!({"title": "Plain Text Filter"}));
        let meta = FilterMeta::from_schema("okf_commaseparatedvalues", &doc, 1);
        assert_eq!(meta.name, "Comma Separated Values (CSV)");

        let meta = FilterMeta::from_schema("okf_unknown_text", &doc, 1);
        assert_eq!(meta.name, "okf_unknown_text");
    }

    #[test]
    fn test_matches_extension_and_mime() {
        let doc = schema(json!({
            "title": "PO Filter",
            "x-filter": {"extensions": [".po", ".pot"], "mimeTypes": ["application/x-gettext"]}
        }));
        let meta = FilterMeta::from_schema("okf_po", &doc, 1);
        assert!(meta.matches(".pot"));
        assert!(meta.matches("gettext"));
        assert!(!meta.matches("xliff"));
    }

    #[test]
    fn test_editor_hints() {
        let doc = schema(json!({
            "properties": {
                "useCodeFinder": {"type": "boolean"},
                "codeFinderRules": {"type": "string", "x-widget": "codeFinderRules", "description": "Rules"}
            }
        }));
        let hints = EditorHints::from_schema(&doc).unwrap();
        let fields = hints.fields.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["codeFinderRules"].widget.as_deref(), Some("codeFinderRules"));
        assert!(hints.groups.is_none());
    }

    #[test]
    fn test_no_hints() {
        let doc = schema(json!({"properties": {"a": {"type": "boolean"}}}));
        assert!(EditorHints::from_schema(&doc).is_none());
    }
}
