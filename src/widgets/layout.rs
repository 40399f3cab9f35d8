//! Form layout: schema groups, then everything else.

use serde::Serialize;

use okapi_schema::SchemaDocument;

use super::{select_widget, WidgetKind};

/// Properties that carry editor plumbing, not user settings.
const INTERNAL_PROPS: &[&str] = &["taggedConfig", "editorTitle", "path", "data"];

/// Widget hints that have no standalone field.
const SKIPPED_WIDGETS: &[&str] = &["simplifierRulesEditor"];

/// Label of the trailing section when the schema declares groups.
pub const OTHER_SECTION: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub key: String,
    pub label: String,
    pub widget: WidgetKind,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Boolean property that switches a code-finder rules field on and off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub collapsed: bool,
    pub fields: Vec<FormField>,
}

/// Whether `key` gets a field of its own.
pub fn is_renderable(key: &str, schema: &SchemaDocument) -> bool {
    if INTERNAL_PROPS.contains(&key) {
        return false;
    }
    let Some(prop) = schema.property(key) else {
        return false;
    };
    if prop
        .widget
        .as_deref()
        .is_some_and(|w| SKIPPED_WIDGETS.contains(&w))
    {
        return false;
    }
    // Code-finder toggles are shown with their rules field.
    if is_code_finder_toggle(key) {
        let rules_key = toggle_rules_key(key);
        if schema.property(&rules_key).is_some() || schema.property("codeFinderRules").is_some() {
            return false;
        }
    }
    true
}

fn is_code_finder_toggle(key: &str) -> bool {
    key.strip_prefix("use")
        .is_some_and(|rest| rest.ends_with("CodeFinder"))
}

fn toggle_rules_key(key: &str) -> String {
    let rest = key.strip_prefix("use").unwrap_or(key);
    match rest.strip_suffix("CodeFinder") {
        Some(stem) => format!("{}codeFinderRules", stem),
        None => rest.to_string(),
    }
}

/// `codeFinderRules` → `useCodeFinder`; other keys have no toggle name.
fn rules_toggle_key(key: &str) -> Option<String> {
    let stem = key.strip_suffix("Rules").unwrap_or(key);
    stem.strip_prefix("codeFinder")
        .map(|rest| format!("useCodeFinder{}", rest))
}

fn field(key: &str, schema: &SchemaDocument) -> Option<FormField> {
    let prop = schema.property(key)?;
    let widget = select_widget(key, prop);
    let toggle = match widget {
        WidgetKind::CodeFinderRules => rules_toggle_key(key)
            .filter(|toggle| toggle != key && schema.property(toggle).is_some()),
        _ => None,
    };
    Some(FormField {
        key: key.to_string(),
        label: prop
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| key.to_string()),
        widget,
        deprecated: prop.deprecated,
        toggle,
    })
}

/// Sections of the form for a schema.
///
/// Groups come first in schema order, keeping only renderable fields the
/// schema defines. Remaining renderable fields go into a trailing section,
/// labelled "Other" when groups exist. Empty sections are dropped.
pub fn form_layout(schema: &SchemaDocument) -> Vec<FormSection> {
    let mut sections = Vec::new();
    let mut placed: Vec<&str> = Vec::new();

    for group in schema.groups() {
        let fields: Vec<FormField> = group
            .fields
            .iter()
            .filter(|key| is_renderable(key, schema))
            .filter_map(|key| field(key, schema))
            .collect();
        placed.extend(group.fields.iter().map(String::as_str));
        if fields.is_empty() {
            continue;
        }
        sections.push(FormSection {
            id: Some(group.id.clone()),
            label: Some(group.label.clone()),
            description: group.description.clone(),
            collapsed: group.collapsed,
            fields,
        });
    }

    let rest: Vec<FormField> = schema
        .properties
        .keys()
        .filter(|key| !placed.contains(&key.as_str()))
        .filter(|key| is_renderable(key, schema))
        .filter_map(|key| field(key, schema))
        .collect();
    if !rest.is_empty() {
        let grouped = !schema.groups().is_empty();
        sections.push(FormSection {
            id: None,
            label: grouped.then(|| OTHER_SECTION.to_string()),
            description: None,
            collapsed: false,
            fields: rest,
        });
    }
    sections
}
