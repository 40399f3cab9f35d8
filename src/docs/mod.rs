//! Filter documentation
//!
//! A separate JSON bundle holds per-filter overviews and per-parameter
//! notes. Some filter ids are aliases of a documented filter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Errors raised while loading the documentation bundle.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    #[error("Failed to read docs bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse docs bundle JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Docs bundle not found: {0}")]
    NotFound(PathBuf),
}

/// A parameter that must hold a given value for another one to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDependency {
    pub property: String,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDoc {
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<ParamDependency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced_in: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocExample {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Documentation for one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDoc {
    pub filter_name: String,
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub limitations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processing_notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<DocExample>,
    /// Parameter docs in bundle order.
    #[serde(default)]
    pub parameters: IndexMap<String, ParamDoc>,
}

/// The documentation bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDocs {
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub filters: BTreeMap<String, FilterDoc>,
    /// Alias id → documented filter id.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl FilterDocs {
    pub fn from_json(content: &str) -> Result<Self, DocsError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, DocsError> {
        if !path.exists() {
            return Err(DocsError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let docs = Self::from_json(&content)?;
        debug!(path = %path.display(), filters = docs.filters.len(), "loaded filter docs");
        Ok(docs)
    }

    /// Docs for a filter, following one alias hop.
    pub fn filter_doc(&self, filter_id: &str) -> Option<&FilterDoc> {
        self.filters.get(filter_id).or_else(|| {
            self.aliases
                .get(filter_id)
                .and_then(|target| self.filters.get(target))
        })
    }

    pub fn param_doc(&self, filter_id: &str, param: &str) -> Option<&ParamDoc> {
        self.filter_doc(filter_id)?.parameters.get(param)
    }
}
