//! Dedicated editor families.
//!
//! Some filters have a hand-built editor instead of the generic
//! schema-driven form. Filters not listed here use [`form_layout`].
//!
//! [`form_layout`]: crate::widgets::form_layout

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorKind {
    Json,
    Xliff,
    Markdown,
    Mif,
    OpenOffice,
    OpenXml,
    Po,
    Properties,
    Regex,
    Table,
    Ts,
    Idml,
    Plaintext,
}

/// Filter id → editor family.
const EDITORS: &[(&str, EditorKind)] = &[
    ("okf_json", EditorKind::Json),
    ("okf_xliff", EditorKind::Xliff),
    ("okf_markdown", EditorKind::Markdown),
    ("okf_mif", EditorKind::Mif),
    ("okf_openoffice", EditorKind::OpenOffice),
    ("okf_openxml", EditorKind::OpenXml),
    ("okf_po", EditorKind::Po),
    ("okf_properties", EditorKind::Properties),
    ("okf_regex", EditorKind::Regex),
    ("okf_table", EditorKind::Table),
    ("okf_table_csv", EditorKind::Table),
    ("okf_table_tsv", EditorKind::Table),
    ("okf_table_fwc", EditorKind::Table),
    ("okf_ts", EditorKind::Ts),
    ("okf_idml", EditorKind::Idml),
    ("okf_plaintext", EditorKind::Plaintext),
    // table sub-filters
    ("okf_commaseparatedvalues", EditorKind::Table),
    ("okf_tabseparatedvalues", EditorKind::Table),
    ("okf_fixedwidthcolumns", EditorKind::Table),
];

impl EditorKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xliff => "XLIFF",
            Self::Markdown => "Markdown",
            Self::Mif => "MIF",
            Self::OpenOffice => "OpenOffice",
            Self::OpenXml => "OpenXML",
            Self::Po => "PO",
            Self::Properties => "Properties",
            Self::Regex => "Regex",
            Self::Table => "Table",
            Self::Ts => "TS",
            Self::Idml => "IDML",
            Self::Plaintext => "Plain Text",
        }
    }
}

impl fmt::Display for EditorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The dedicated editor for a filter, if it has one.
pub fn editor_for(filter_id: &str) -> Option<EditorKind> {
    EDITORS
        .iter()
        .find(|(id, _)| *id == filter_id)
        .map(|(_, kind)| *kind)
}

pub fn has_editor(filter_id: &str) -> bool {
    editor_for(filter_id).is_some()
}
