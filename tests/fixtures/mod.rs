//! Shared fixtures for integration tests
//!
//! - `bundle.json`: five filters over two Okapi versions, with groups,
//!   widget hints, presets and a `schemaRef` redirect
//! - `docs.json`: documentation for two filters plus an alias
//! - `legacy.fprm`: plain-text parameters with a key later Okapi dropped

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use okapi_config::{Registry, Session, SessionView};

pub const LATEST: &str = "1.47.0";
pub const PREVIOUS: &str = "1.46.0";

pub fn bundle_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/bundle.json")
}

pub fn docs_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/docs.json")
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

pub fn registry() -> Registry {
    Registry::load(&bundle_path()).expect("Failed to load fixture bundle")
}

/// Open a session that must exist.
pub fn session<'a>(registry: &'a Registry, filter_id: &str, version: &str) -> Session<'a> {
    match Session::open(registry, filter_id, version) {
        SessionView::Ready(session) => session,
        SessionView::NotFound { filter_id, okapi_version } => {
            panic!("fixture filter {} missing for {}", filter_id, okapi_version)
        }
    }
}

/// Unwrap a JSON object literal.
pub fn object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}
