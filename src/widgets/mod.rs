//! Widget dispatch
//!
//! Each property is rendered by one [`WidgetKind`]. The kind comes from the
//! property's `x-widget` hint when it names a known widget, and from its
//! type otherwise. Every kind can validate a value and render it on one
//! line. Validation only flags problems; invalid values still serialize.

pub mod layout;
pub mod lists;
pub mod patterns;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use okapi_codec::code_finder::parse_rules;
use okapi_schema::SchemaProperty;

pub use layout::{form_layout, is_renderable, FormField, FormSection};
pub use patterns::{apply_pattern, test_pattern, test_rules, PatternTest};

/// Strings with a default longer than this render as a text area.
const LONG_DEFAULT: usize = 50;

/// Longest value `display` prints before truncating.
const DISPLAY_WIDTH: usize = 60;

/// The widget a property is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetKind {
    Checkbox,
    Text,
    Textarea,
    Select,
    Number,
    TagList,
    EnumRadio,
    DelimiterPicker,
    CodeFinderRules,
    FilterSelector,
    RegexBuilder,
    ColumnIndexList,
    CodeEditor,
}

impl WidgetKind {
    /// Map an `x-widget` hint to a kind; `None` for hints with no widget.
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "checkbox" => Some(Self::Checkbox),
            "text" => Some(Self::Text),
            "textarea" => Some(Self::Textarea),
            "select" => Some(Self::Select),
            "number" => Some(Self::Number),
            "tagList" => Some(Self::TagList),
            "enumRadio" => Some(Self::EnumRadio),
            "delimiterPicker" => Some(Self::DelimiterPicker),
            "codeFinderRules" | "codeFinder" => Some(Self::CodeFinderRules),
            "filterSelector" => Some(Self::FilterSelector),
            "regexBuilder" => Some(Self::RegexBuilder),
            "columnIndexList" => Some(Self::ColumnIndexList),
            "codeEditor" => Some(Self::CodeEditor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkbox => "checkbox",
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Number => "number",
            Self::TagList => "tagList",
            Self::EnumRadio => "enumRadio",
            Self::DelimiterPicker => "delimiterPicker",
            Self::CodeFinderRules => "codeFinderRules",
            Self::FilterSelector => "filterSelector",
            Self::RegexBuilder => "regexBuilder",
            Self::ColumnIndexList => "columnIndexList",
            Self::CodeEditor => "codeEditor",
        }
    }

    /// Problems with `value` for a property edited with this widget.
    ///
    /// Null values and absent properties are never flagged.
    pub fn validate(&self, value: &Value, prop: &SchemaProperty) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        if value.is_null() {
            return issues;
        }
        if let Some(expected) = prop.type_name() {
            if !matches_type(value, expected) {
                issues.push(FieldIssue::new(
                    IssueKind::TypeMismatch,
                    format!("expected {}, got {}", expected, type_of(value)),
                ));
                return issues;
            }
        }

        if let Some(allowed) = prop.enum_values() {
            if !allowed.iter().any(|v| crate::diff::values_equal(v, value)) {
                issues.push(FieldIssue::new(
                    IssueKind::NotInEnum,
                    format!("{} is not one of the allowed values", value),
                ));
            }
        }

        if let Some(n) = value.as_f64() {
            if prop.minimum.is_some_and(|min| n < min) || prop.maximum.is_some_and(|max| n > max) {
                issues.push(FieldIssue::new(
                    IssueKind::OutOfRange,
                    format!("{} is outside {}", n, range_text(prop)),
                ));
            }
        }

        let Some(text) = value.as_str() else {
            return issues;
        };
        match self {
            Self::RegexBuilder => {
                if let Some(issue) = check_regex(text) {
                    issues.push(issue);
                }
            }
            Self::CodeFinderRules => {
                for (index, rule) in parse_rules(text).iter().enumerate() {
                    if let Some(mut issue) = check_regex(rule) {
                        issue.message = format!("rule {}: {}", index, issue.message);
                        issues.push(issue);
                    }
                }
            }
            Self::ColumnIndexList => {
                for entry in lists::invalid_columns(text, separator(prop)) {
                    issues.push(FieldIssue::new(
                        IssueKind::InvalidColumn,
                        format!("{:?} is not a column number", entry),
                    ));
                }
            }
            _ => {}
        }
        issues
    }

    /// Single-line rendering of `value` for this widget.
    pub fn display(&self, value: &Value, prop: &SchemaProperty) -> String {
        match (self, value) {
            (_, Value::Null) => "(none)".to_string(),
            (Self::Checkbox, Value::Bool(b)) => (if *b { "[x]" } else { "[ ]" }).to_string(),
            (Self::Select | Self::EnumRadio, _) => enum_label(value, prop),
            (Self::TagList, Value::String(s)) => {
                let tags = lists::split_tags(s, separator(prop));
                if tags.is_empty() {
                    "(empty)".to_string()
                } else {
                    tags.iter().map(|t| format!("[{}]", t)).collect::<Vec<_>>().join(" ")
                }
            }
            (Self::ColumnIndexList, Value::String(s)) => {
                let columns = lists::parse_columns(s, separator(prop));
                if columns.is_empty() {
                    "(none)".to_string()
                } else {
                    columns.iter().map(|c| format!("Col {}", c)).collect::<Vec<_>>().join(", ")
                }
            }
            (Self::DelimiterPicker, Value::String(s)) => lists::delimiter_label(s),
            (Self::CodeFinderRules, Value::String(s)) => match parse_rules(s).len() {
                1 => "1 rule".to_string(),
                n => format!("{} rules", n),
            },
            (_, Value::String(s)) => truncate(&s.replace('\n', "\\n")),
            _ => truncate(&value.to_string()),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    InvalidRegex,
    TypeMismatch,
    NotInEnum,
    OutOfRange,
    InvalidColumn,
}

/// A non-blocking problem with one field's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Property key; filled in by callers that validate a whole form.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field: String,
    pub kind: IssueKind,
    pub message: String,
}

impl FieldIssue {
    fn new(kind: IssueKind, message: String) -> Self {
        Self {
            field: String::new(),
            kind,
            message,
        }
    }

    pub fn for_field(mut self, key: &str) -> Self {
        self.field = key.to_string();
        self
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Pick the widget for a property.
pub fn select_widget(key: &str, prop: &SchemaProperty) -> WidgetKind {
    if let Some(kind) = prop.widget.as_deref().and_then(WidgetKind::from_hint) {
        return kind;
    }
    if prop.enum_values().is_some() {
        return WidgetKind::Select;
    }
    match prop.type_name() {
        Some("boolean") => WidgetKind::Checkbox,
        Some("integer" | "number") => WidgetKind::Number,
        Some("string") if wants_textarea(key, prop) => WidgetKind::Textarea,
        _ => WidgetKind::Text,
    }
}

fn wants_textarea(key: &str, prop: &SchemaProperty) -> bool {
    let key = key.to_lowercase();
    if key.contains("rules") || key.contains("pattern") {
        return true;
    }
    prop.default
        .as_ref()
        .and_then(Value::as_str)
        .is_some_and(|d| d.chars().count() > LONG_DEFAULT)
}

/// Validate `value` against the widget selected for `key`.
pub fn validate_field(key: &str, value: &Value, prop: &SchemaProperty) -> Vec<FieldIssue> {
    select_widget(key, prop)
        .validate(value, prop)
        .into_iter()
        .map(|issue| issue.for_field(key))
        .collect()
}

/// Enum options as `(value, label)` pairs, labels from `x-enumLabels`.
pub fn enum_options(prop: &SchemaProperty) -> Vec<(Value, String)> {
    let labels = prop.enum_labels.as_deref().unwrap_or_default();
    prop.enum_values()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let label = labels
                .get(i)
                .filter(|l| !l.is_empty())
                .cloned()
                .unwrap_or_else(|| plain_text(value));
            (value.clone(), label)
        })
        .collect()
}

/// Interpret raw text typed for a property, following its declared type.
///
/// Text that does not fit the type is kept as a string so validation can
/// flag it.
pub fn parse_input(raw: &str, prop: &SchemaProperty) -> Value {
    let parsed = match prop.type_name() {
        Some("boolean") => match raw.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        Some("integer") => raw.trim().parse::<i64>().ok().map(Value::from),
        Some("number") => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .ok()
            .or_else(|| {
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
            }),
        Some("array" | "object") => serde_json::from_str(raw).ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

fn check_regex(pattern: &str) -> Option<FieldIssue> {
    if pattern.is_empty() {
        return None;
    }
    regex_lite::Regex::new(pattern)
        .err()
        .map(|err| FieldIssue::new(IssueKind::InvalidRegex, format!("invalid pattern: {}", err)))
}

/// List separator of a tag or column field (`x-separator`).
pub(crate) fn separator(prop: &SchemaProperty) -> &str {
    prop.extra
        .get("x-separator")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(lists::DEFAULT_SEPARATOR)
}

fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "boolean" => value.is_boolean(),
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0),
        "number" => value.is_number(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn range_text(prop: &SchemaProperty) -> String {
    match (prop.minimum, prop.maximum) {
        (Some(min), Some(max)) => format!("[{}, {}]", min, max),
        (Some(min), None) => format!(">= {}", min),
        (None, Some(max)) => format!("<= {}", max),
        (None, None) => String::new(),
    }
}

fn enum_label(value: &Value, prop: &SchemaProperty) -> String {
    enum_options(prop)
        .into_iter()
        .find(|(v, _)| crate::diff::values_equal(v, value))
        .map(|(_, label)| label)
        .unwrap_or_else(|| plain_text(value))
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= DISPLAY_WIDTH {
        return text.to_string();
    }
    let cut: String = text.chars().take(DISPLAY_WIDTH - 3).collect();
    format!("{}...", cut)
}
