//! Okapi filter configuration engine
//!
//! Resolves a filter's schema for an Okapi version, tracks a form state
//! against schema defaults and preset baselines, and renders the sparse
//! set of changed parameters as a native `.fprm`, YAML or JSON file.

pub mod baseline;
pub mod config;
pub mod diff;
pub mod dirty;
pub mod docs;
pub mod editors;
pub mod session;
pub mod share;
pub mod widgets;

/// Current value of every parameter being edited.
pub type FormState = okapi_schema::ConfigMap;

/// Values that "unchanged" is measured against.
pub type BaselineMap = okapi_schema::ConfigMap;

/// Only the parameters that differ from a baseline.
pub type SparseConfig = okapi_schema::ConfigMap;

pub use baseline::{compute_baseline, compute_defaults};
pub use diff::{diff, merge, values_equal};
pub use dirty::{dirty_keys, dirty_lines, field_modified};
pub use docs::{DocsError, FilterDoc, FilterDocs, ParamDoc};
pub use editors::{editor_for, has_editor, EditorKind};
pub use session::{read_state_file, Rendered, Session, SessionError, SessionView};
pub use share::{build_link, decode_config, encode_config, parse_query, ShareState};
pub use widgets::{select_widget, test_pattern, FieldIssue, PatternTest, WidgetKind};

pub use okapi_codec::{OutputFormat, Syntax};
pub use okapi_schema::{Preset, Registry, RegistryError, SchemaDocument};
