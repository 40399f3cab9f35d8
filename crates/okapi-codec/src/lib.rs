//! Serialization of sparse filter configurations.
//!
//! Three renderings are supported: the native line-oriented `.fprm`
//! format, YAML and JSON. [`format_config`] picks one from the requested
//! output format and the filter's native serialization family.

pub mod code_finder;
pub mod error;
pub mod format;
pub mod lines;
pub mod native;
pub mod structured;

pub use error::CodecError;
pub use format::{format_config, output_formats, FormatOption, OutputFormat, Syntax};
pub use lines::{extract_key, tokenize_line, Token, TokenKind};
pub use native::{parse_native, to_native, HEADER};
pub use structured::{to_json, to_yaml};
