//! Okapi filter configuration CLI
//!
//! Entry point for the `okapi-config` command-line tool.

use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use okapi_codec::{output_formats, tokenize_line, OutputFormat, Syntax, TokenKind};
use okapi_config::config::{
    project_settings_path, user_settings_path, ColorMode, EffectiveSettings, Settings, SettingsError,
};
use okapi_config::share::{build_link, decode_config, parse_query, ShareState};
use okapi_config::widgets::{form_layout, select_widget};
use okapi_config::{
    editor_for, read_state_file, FilterDocs, Registry, Session, SessionError, SessionView,
};
use tracing::warn;

/// Exit code for unknown filters, versions and presets.
const EXIT_NOT_FOUND: i32 = 2;

#[derive(Parser)]
#[command(name = "okapi-config")]
#[command(about = "Schema-driven configuration for Okapi filters", version)]
struct Cli {
    /// Data bundle (default from settings)
    #[arg(long, global = true)]
    bundle: Option<PathBuf>,

    /// Filter documentation bundle (default from settings)
    #[arg(long, global = true)]
    docs: Option<PathBuf>,

    /// Okapi version (default: latest in the bundle)
    #[arg(long, global = true)]
    okapi: Option<String>,

    /// Project settings file (default: .okapi-config.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List Okapi versions in the bundle
    Versions,

    /// List or search filters
    Filters {
        /// Case-insensitive search over names, ids, extensions and MIME types
        #[arg(long, short = 'q')]
        query: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show a filter's metadata and form layout
    Show {
        filter: String,

        /// Start from a preset
        #[arg(long, short = 'p')]
        preset: Option<String>,
    },

    /// List a filter's presets
    Presets {
        filter: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the baseline values as JSON
    Defaults {
        filter: String,

        #[arg(long, short = 'p')]
        preset: Option<String>,
    },

    /// Render the changed parameters
    Render {
        filter: String,

        #[command(flatten)]
        edits: EditArgs,

        /// Output format: fprm, yaml or json (default from settings)
        #[arg(long, short = 'f')]
        format: Option<String>,

        /// Print a JSON envelope with text, dirty keys and issues
        #[arg(long)]
        json: bool,
    },

    /// Print a share link for a configuration
    Link {
        filter: String,

        #[command(flatten)]
        edits: EditArgs,
    },

    /// Test a pattern field against sample text
    TestPattern {
        filter: String,

        /// Field holding a regex or code-finder rules
        key: String,

        /// Text to match
        #[arg(long)]
        sample: String,

        #[command(flatten)]
        edits: EditArgs,
    },

    /// Print filter documentation
    Docs {
        filter: String,

        /// Only this parameter
        param: Option<String>,
    },

    /// Print the effective settings and where they came from
    Settings,
}

/// How the form state is built.
#[derive(clap::Args)]
struct EditArgs {
    /// Start from a preset
    #[arg(long, short = 'p')]
    preset: Option<String>,

    /// Form values from a JSON object or `.fprm` file
    #[arg(long, short = 's')]
    state: Option<PathBuf>,

    /// Shared config: a link, a query string or a bare base64 payload
    #[arg(long)]
    config: Option<String>,

    /// Set one value, `key=value`; may be repeated
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Add an entry to a list or rules field; may be repeated
    #[arg(long = "add", value_name = "KEY=ITEM")]
    add: Vec<String>,

    /// Remove the entry at INDEX from a list or rules field; may be repeated
    #[arg(long = "remove", value_name = "KEY=INDEX")]
    remove: Vec<String>,

    /// Apply a named pattern preset to a regex or rules field
    #[arg(long = "pattern", value_name = "KEY=NAME")]
    pattern: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let effective = match load_settings(&cli) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };
    let settings = match effective.settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };

    let bundle = || {
        let registry = load_registry(&settings);
        let version = okapi_version(&registry, &settings);
        (registry, version)
    };

    match cli.command {
        Commands::Versions => {
            let (registry, version) = bundle();
            run_versions(&registry, &version);
        }
        Commands::Filters { query, json } => {
            let (registry, version) = bundle();
            run_filters(&registry, &version, query.as_deref(), json);
        }
        Commands::Show { filter, preset } => {
            let (registry, version) = bundle();
            run_show(&registry, &version, &filter, preset.as_deref());
        }
        Commands::Presets { filter, json } => {
            let (registry, version) = bundle();
            run_presets(&registry, &version, &filter, json);
        }
        Commands::Defaults { filter, preset } => {
            let (registry, version) = bundle();
            run_defaults(&registry, &version, &filter, preset.as_deref());
        }
        Commands::Render {
            filter,
            edits,
            format,
            json,
        } => {
            let (registry, version) = bundle();
            let session = edit_session(&registry, &version, cli.okapi.as_deref(), &filter, &edits);
            run_render(&session, &settings, format.as_deref(), json);
        }
        Commands::Link { filter, edits } => {
            let (registry, version) = bundle();
            let session = edit_session(&registry, &version, cli.okapi.as_deref(), &filter, &edits);
            run_link(&registry, &settings, &session);
        }
        Commands::TestPattern {
            filter,
            key,
            sample,
            edits,
        } => {
            let (registry, version) = bundle();
            let session = edit_session(&registry, &version, cli.okapi.as_deref(), &filter, &edits);
            run_test_pattern(&session, &key, &sample);
        }
        Commands::Docs { filter, param } => run_docs(&settings, &filter, param.as_deref()),
        Commands::Settings => match effective.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> Result<EffectiveSettings, SettingsError> {
    let mut overrides = serde_json::Map::new();
    if let Some(path) = &cli.bundle {
        overrides.insert("data".into(), json!({"bundle": path.to_string_lossy()}));
    }
    if let Some(path) = &cli.docs {
        let data = overrides.entry("data").or_insert_with(|| json!({}));
        if let Some(table) = data.as_object_mut() {
            table.insert("docs".into(), json!(path.to_string_lossy()));
        }
    }
    if let Some(version) = &cli.okapi {
        overrides.insert("okapi_version".into(), json!(version));
    }

    if let Some(path) = cli.settings.as_ref().filter(|p| !p.exists()) {
        return Err(SettingsError::Io {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
        });
    }

    let user = user_settings_path();
    let project = cli.settings.clone().unwrap_or_else(project_settings_path);
    let cli_layer = (!overrides.is_empty()).then_some(Value::Object(overrides));
    EffectiveSettings::build(user.as_deref(), Some(&project), cli_layer)
}

fn load_registry(settings: &Settings) -> Registry {
    match Registry::load(&settings.data.bundle) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading bundle: {}", e);
            process::exit(1);
        }
    }
}

/// The requested Okapi version, or the bundle's latest.
fn okapi_version(registry: &Registry, settings: &Settings) -> String {
    match settings.okapi_version.as_deref() {
        Some(v) if registry.has_version(v) => v.to_string(),
        Some(v) => {
            eprintln!("Okapi version '{}' is not in the bundle.", v);
            eprintln!("Available versions: {}", registry.okapi_versions().join(", "));
            process::exit(EXIT_NOT_FOUND);
        }
        None => match registry.latest_version() {
            Some(v) => v.to_string(),
            None => {
                eprintln!("The bundle lists no Okapi versions.");
                process::exit(1);
            }
        },
    }
}

fn open_session<'a>(registry: &'a Registry, version: &str, filter: &str) -> Session<'a> {
    match Session::open(registry, filter, version) {
        SessionView::Ready(session) => session,
        SessionView::NotFound {
            filter_id,
            okapi_version,
        } => {
            eprintln!("Filter '{}' not found for Okapi {}.", filter_id, okapi_version);
            process::exit(EXIT_NOT_FOUND);
        }
    }
}

fn exit_session_error(e: SessionError) -> ! {
    eprintln!("Error: {}", e);
    match e {
        SessionError::UnknownPreset { .. } | SessionError::UnknownPattern { .. } => {
            process::exit(EXIT_NOT_FOUND)
        }
        SessionError::Registry(ref inner) if inner.is_not_found() => process::exit(EXIT_NOT_FOUND),
        _ => process::exit(1),
    }
}

fn select_preset(session: &mut Session<'_>, preset: Option<&str>) {
    if preset.is_some() {
        if let Err(e) = session.select_preset(preset) {
            exit_session_error(e);
        }
    }
}

/// The share state carried by `--config`, if any.
fn shared_state(edits: &EditArgs) -> Option<ShareState> {
    let config = edits.config.as_deref()?;
    let state = if config.contains('=') && !looks_like_base64(config) {
        parse_query(config)
    } else {
        ShareState {
            config: decode_config(config).unwrap_or_default(),
            ..ShareState::default()
        }
    };
    Some(state)
}

/// Open a session and apply every edit flag.
///
/// A shared config brings its own Okapi version unless `--okapi` pins one.
fn edit_session<'a>(
    registry: &'a Registry,
    version: &str,
    pinned: Option<&str>,
    filter: &str,
    edits: &EditArgs,
) -> Session<'a> {
    let shared = shared_state(edits);
    let link_version = shared.as_ref().and_then(|s| s.okapi_version.as_deref());
    let version = match (pinned, link_version) {
        (None, Some(v)) if registry.has_version(v) => v,
        (None, Some(v)) => {
            warn!(okapi_version = v, "shared Okapi version is not in the bundle, using {}", version);
            version
        }
        _ => version,
    };

    let mut session = open_session(registry, version, filter);
    apply_edits(&mut session, edits, shared);
    session
}

/// Apply `--config`, `--preset`, `--state`, `--set`, `--add`, `--remove`
/// and `--pattern`, in that order.
fn apply_edits(session: &mut Session<'_>, edits: &EditArgs, shared: Option<ShareState>) {
    if let Some(mut state) = shared {
        state.okapi_version = Some(session.okapi_version().to_string());
        if edits.preset.is_some() {
            state.preset_id = edits.preset.clone();
        }
        if let Err(e) = session.restore(&state) {
            exit_session_error(e);
        }
    } else {
        select_preset(session, edits.preset.as_deref());
    }

    if let Some(path) = &edits.state {
        match read_state_file(path) {
            Ok(values) => {
                let unknown = session.import(values);
                if !unknown.is_empty() {
                    eprintln!(
                        "warning: {} is not in the {} schema: {}",
                        path.display(),
                        session.meta().id,
                        unknown.join(", ")
                    );
                }
            }
            Err(e) => exit_session_error(e),
        }
    }

    for assignment in &edits.set {
        let (key, raw) = split_assignment("--set", assignment, "KEY=VALUE");
        session.set_field_text(key, raw);
    }
    for assignment in &edits.add {
        let (key, item) = split_assignment("--add", assignment, "KEY=ITEM");
        if let Err(e) = session.add_item(key, item) {
            exit_session_error(e);
        }
    }
    for assignment in &edits.remove {
        let (key, raw) = split_assignment("--remove", assignment, "KEY=INDEX");
        let Ok(index) = raw.trim().parse::<usize>() else {
            eprintln!("Invalid --remove '{}': INDEX must be a number", assignment);
            process::exit(1);
        };
        if let Err(e) = session.remove_item(key, index) {
            exit_session_error(e);
        }
    }
    for assignment in &edits.pattern {
        let (key, name) = split_assignment("--pattern", assignment, "KEY=NAME");
        if let Err(e) = session.apply_pattern_preset(key, name) {
            exit_session_error(e);
        }
    }
}

fn split_assignment<'s>(flag: &str, assignment: &'s str, expected: &str) -> (&'s str, &'s str) {
    match assignment.split_once('=') {
        Some((key, value)) => (key.trim(), value),
        None => {
            eprintln!("Invalid {} '{}': expected {}", flag, assignment, expected);
            process::exit(1);
        }
    }
}

/// Base64 payloads only carry `=` as trailing padding.
fn looks_like_base64(text: &str) -> bool {
    let body = text.trim_end_matches('=');
    !body.contains('=') && !body.contains('?') && !body.contains('&')
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_versions(registry: &Registry, active: &str) {
    let latest = registry.latest_version();
    for version in registry.okapi_versions().iter().rev() {
        let mut notes = Vec::new();
        if Some(version.as_str()) == latest {
            notes.push("latest");
        }
        if version == active {
            notes.push("active");
        }
        if notes.is_empty() {
            println!("{}", version);
        } else {
            println!("{}  ({})", version, notes.join(", "));
        }
    }
}

fn run_filters(registry: &Registry, version: &str, query: Option<&str>, json_output: bool) {
    let mut filters = registry.search(query.unwrap_or_default(), version);
    filters.sort_by(|a, b| a.meta.name.to_lowercase().cmp(&b.meta.name.to_lowercase()));

    if json_output {
        let metas: Vec<_> = filters.iter().map(|f| &f.meta).collect();
        print_json(&json!(metas));
        return;
    }

    if filters.is_empty() {
        match query {
            Some(q) => println!("No filters match '{}' in Okapi {}.", q, version),
            None => println!("No filters in Okapi {}.", version),
        }
        return;
    }

    println!("Filters in Okapi {} ({} total):\n", version, filters.len());
    for filter in filters {
        let extensions = if filter.meta.extensions.is_empty() {
            String::new()
        } else {
            format!("  [{}]", filter.meta.extensions.join(" "))
        };
        println!("  {:<32} {}{}", filter.meta.id, filter.meta.name, extensions);
    }
}

fn run_show(registry: &Registry, version: &str, filter: &str, preset: Option<&str>) {
    let mut session = open_session(registry, version, filter);
    select_preset(&mut session, preset);

    let meta = session.meta();
    let schema = session.schema();
    let family = schema.serialization_family();

    println!("{} ({})", meta.name, meta.id);
    if !meta.description.is_empty() {
        println!("  {}", meta.description);
    }
    println!("  Okapi: {}  schema v{}", session.okapi_version(), meta.schema_version);
    if !meta.class.is_empty() {
        println!("  Class: {}", meta.class);
    }
    if !meta.mime_type.is_empty() {
        println!("  MIME type: {}", meta.mime_type);
    }
    if !meta.extensions.is_empty() {
        println!("  Extensions: {}", meta.extensions.join(", "));
    }
    match editor_for(session.filter_id()) {
        Some(editor) => println!("  Editor: {}", editor),
        None => println!("  Editor: generic"),
    }
    let formats: Vec<&str> = output_formats(family).iter().map(|o| o.label).collect();
    println!("  Formats: {}", formats.join(", "));
    if let Some(p) = session.preset() {
        println!("  Preset: {} ({})", p.name, p.config_id);
    }

    for section in form_layout(schema) {
        println!();
        match &section.label {
            Some(label) if section.collapsed => println!("{} (collapsed)", label),
            Some(label) => println!("{}", label),
            None => println!("Parameters"),
        }
        for field in &section.fields {
            let value = session.form_state().get(&field.key).cloned().unwrap_or(Value::Null);
            let shown = match schema.property(&field.key) {
                Some(prop) => select_widget(&field.key, prop).display(&value, prop),
                None => value.to_string(),
            };
            let marker = if session.field_modified(&field.key) { '*' } else { ' ' };
            let deprecated = if field.deprecated { " (deprecated)" } else { "" };
            let shown = match session.field_hint(&field.key).and_then(|h| h.placeholder.as_deref()) {
                Some(placeholder) if shown.is_empty() => format!("<{}>", placeholder),
                _ => shown,
            };
            println!(
                " {} {:<28} {:<16} {}{}",
                marker, field.key, field.widget.as_str(), shown, deprecated
            );
            let presets: Vec<&str> = session.pattern_presets(&field.key).into_iter().map(|(name, _)| name).collect();
            if !presets.is_empty() {
                println!("   {:<28} presets: {}", "", presets.join(", "));
            }
        }
    }
}

fn run_presets(registry: &Registry, version: &str, filter: &str, json_output: bool) {
    let session = open_session(registry, version, filter);
    let presets = session.presets();

    if json_output {
        print_json(&json!(presets));
        return;
    }
    if presets.is_empty() {
        println!("No presets for {} in Okapi {}.", filter, version);
        return;
    }
    let default_id = registry.default_preset(filter, version).map(|p| p.config_id.as_str());
    for preset in presets {
        let default = if Some(preset.config_id.as_str()) == default_id { "  (default)" } else { "" };
        println!("  {:<32} {}{}", preset.config_id, preset.name, default);
        if let Some(target) = &preset.schema_ref {
            println!("    schema: {}", target);
        }
        if !preset.description.is_empty() {
            println!("    {}", preset.description);
        }
    }
}

fn run_defaults(registry: &Registry, version: &str, filter: &str, preset: Option<&str>) {
    let mut session = open_session(registry, version, filter);
    select_preset(&mut session, preset);
    print_json(&Value::Object(session.baseline().clone()));
}

fn run_render(session: &Session<'_>, settings: &Settings, format: Option<&str>, json_output: bool) {
    let format = match format {
        Some(f) => match f.parse::<OutputFormat>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
        None => settings.output.format,
    };

    let rendered = match session.render(format) {
        Ok(r) => r,
        Err(e) => exit_session_error(e),
    };
    let issues = session.issues();

    if json_output {
        print_json(&json!({
            "filterId": session.meta().id,
            "okapiVersion": session.okapi_version(),
            "preset": session.preset().map(|p| &p.config_id),
            "format": rendered.format,
            "extension": rendered.extension,
            "text": rendered.text,
            "dirtyKeys": rendered.dirty_keys,
            "dirtyLines": rendered.dirty_lines,
            "issues": issues,
        }));
        return;
    }

    for issue in &issues {
        eprintln!("warning: {}", issue);
    }
    if rendered.text.is_empty() {
        eprintln!("No parameters differ from the defaults.");
        return;
    }
    let color = use_color(settings.output.color);
    print_rendered(&rendered.text, rendered.syntax, &rendered.dirty_lines, color);
}

fn run_link(registry: &Registry, settings: &Settings, session: &Session<'_>) {
    let base = format!("{}/{}", settings.link.base.trim_end_matches('/'), session.filter_id());
    println!("{}", build_link(&base, &session.share_state(), registry.latest_version()));
}

fn run_test_pattern(session: &Session<'_>, key: &str, sample: &str) {
    let results = session.test_field(key, sample);
    if results.is_empty() {
        eprintln!("'{}' holds no pattern.", key);
        process::exit(1);
    }
    for result in results {
        let outcome = match result.matched {
            Some(true) => "match",
            Some(false) => "no match",
            None => "invalid pattern",
        };
        println!("  rule {:<3} {:<40} {}", result.index, result.pattern, outcome);
    }
}

fn run_docs(settings: &Settings, filter: &str, param: Option<&str>) {
    let docs = match FilterDocs::load(&settings.data.docs) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error loading docs: {}", e);
            process::exit(1);
        }
    };
    let Some(doc) = docs.filter_doc(filter) else {
        eprintln!("No documentation for '{}'.", filter);
        process::exit(EXIT_NOT_FOUND);
    };

    if let Some(name) = param {
        let Some(p) = doc.parameters.get(name) else {
            eprintln!("No documentation for parameter '{}' of '{}'.", name, filter);
            process::exit(EXIT_NOT_FOUND);
        };
        println!("{}", name);
        println!("  {}", p.description);
        for note in &p.notes {
            println!("  Note: {}", note);
        }
        for dep in &p.depends_on {
            println!("  Requires: {} {}", dep.property, dep.condition);
        }
        if let Some(since) = &p.introduced_in {
            println!("  Since: Okapi {}", since);
        }
        return;
    }

    println!("{}", doc.filter_name);
    println!();
    println!("{}", doc.overview);
    if let Some(url) = &doc.wiki_url {
        println!();
        println!("Wiki: {}", url);
    }
    if !doc.limitations.is_empty() {
        println!();
        println!("Limitations:");
        for item in &doc.limitations {
            println!("  - {}", item);
        }
    }
    if !doc.processing_notes.is_empty() {
        println!();
        println!("Processing notes:");
        for item in &doc.processing_notes {
            println!("  - {}", item);
        }
    }
    if !doc.parameters.is_empty() {
        println!();
        println!("Parameters:");
        for (name, p) in &doc.parameters {
            println!("  {:<28} {}", name, p.description);
        }
    }
    for example in &doc.examples {
        println!();
        println!("Example: {}", example.title);
        println!("  {}", example.description);
    }
}

fn use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
    }
}

/// Print rendered text with a gutter marking dirty lines.
fn print_rendered(text: &str, syntax: Syntax, dirty: &BTreeSet<usize>, color: bool) {
    for (index, line) in text.split('\n').enumerate() {
        let gutter = if dirty.contains(&index) { '●' } else { ' ' };
        if !color {
            println!("{} {}", gutter, line);
            continue;
        }
        let body: String = tokenize_line(line, syntax)
            .into_iter()
            .map(|token| match ansi_code(token.kind) {
                Some(code) => format!("\x1b[{}m{}\x1b[0m", code, token.text),
                None => token.text,
            })
            .collect();
        if dirty.contains(&index) {
            println!("\x1b[33m{}\x1b[0m {}", gutter, body);
        } else {
            println!("{} {}", gutter, body);
        }
    }
}

fn ansi_code(kind: TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Comment => Some("90"),
        TokenKind::Key => Some("36"),
        TokenKind::TypeSuffix => Some("35"),
        TokenKind::Punctuation => Some("2"),
        TokenKind::String => Some("32"),
        TokenKind::Number => Some("33"),
        TokenKind::Boolean => Some("34"),
        TokenKind::Plain => None,
    }
}
