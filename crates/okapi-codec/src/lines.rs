//! Line-level reading of rendered output: key extraction for dirty-line
//! matching and a small tokenizer for colored display.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde::Serialize;

use crate::format::Syntax;

/// Token classes produced by [`tokenize_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Comment,
    Key,
    TypeSuffix,
    Punctuation,
    String,
    Number,
    Boolean,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

fn json_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^\s*"([^"]+)"\s*:"#).expect("static regex"))
}

fn json_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"("(?:[^"\\]|\\.)*"\s*:)|("(?:[^"\\]|\\.)*")|(-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)|(\btrue\b|\bfalse\b|\bnull\b)|([{}\[\],:])"#,
        )
        .expect("static regex")
    })
}

fn integer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+$").expect("static regex"))
}

fn decimal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("static regex"))
}

/// Split a native key into name and `.b`/`.i` suffix.
fn split_native_suffix(raw_key: &str) -> (&str, Option<&str>) {
    for suffix in [".b", ".i"] {
        if let Some(name) = raw_key.strip_suffix(suffix) {
            if !name.is_empty() {
                return (name, Some(suffix));
            }
        }
    }
    (raw_key, None)
}

/// The property key carried by a rendered line, if it carries one.
///
/// - native: text before `=` minus the type suffix; `#` lines carry none
/// - JSON: the quoted string before `:`
/// - YAML: text before the first `:`; comments and `-` items carry none
pub fn extract_key(line: &str, syntax: Syntax) -> Option<&str> {
    match syntax {
        Syntax::Native => {
            if line.starts_with('#') {
                return None;
            }
            let (raw_key, _) = line.split_once('=')?;
            Some(split_native_suffix(raw_key).0)
        }
        Syntax::Json => json_key_regex()
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str()),
        Syntax::Yaml => {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') || trimmed.starts_with('-') {
                return None;
            }
            let (key, _) = line.split_once(':')?;
            Some(key.trim())
        }
    }
}

/// Tokenize one rendered line for display.
pub fn tokenize_line(line: &str, syntax: Syntax) -> Vec<Token> {
    match syntax {
        Syntax::Native => tokenize_native(line),
        Syntax::Json => tokenize_json(line),
        Syntax::Yaml => tokenize_yaml(line),
    }
}

fn tokenize_native(line: &str) -> Vec<Token> {
    if line.starts_with('#') {
        return vec![Token::new(line, TokenKind::Comment)];
    }
    let Some((raw_key, value)) = line.split_once('=') else {
        return vec![Token::new(line, TokenKind::Plain)];
    };

    let mut tokens = Vec::with_capacity(4);
    match split_native_suffix(raw_key) {
        (name, Some(suffix)) => {
            tokens.push(Token::new(name, TokenKind::Key));
            tokens.push(Token::new(suffix, TokenKind::TypeSuffix));
        }
        (name, None) => tokens.push(Token::new(name, TokenKind::Key)),
    }
    tokens.push(Token::new("=", TokenKind::Punctuation));

    let kind = if value == "true" || value == "false" {
        TokenKind::Boolean
    } else if integer_regex().is_match(value) {
        TokenKind::Number
    } else {
        TokenKind::String
    };
    tokens.push(Token::new(value, kind));
    tokens
}

fn tokenize_json(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in json_token_regex().captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            tokens.push(Token::new(&line[last..whole.start()], TokenKind::Plain));
        }
        if let Some(key) = caps.get(1) {
            let text = key.as_str();
            let colon = text.rfind(':').unwrap_or(text.len());
            tokens.push(Token::new(&text[..colon], TokenKind::Key));
            tokens.push(Token::new(&text[colon..], TokenKind::Punctuation));
        } else if let Some(m) = caps.get(2) {
            tokens.push(Token::new(m.as_str(), TokenKind::String));
        } else if let Some(m) = caps.get(3) {
            tokens.push(Token::new(m.as_str(), TokenKind::Number));
        } else if let Some(m) = caps.get(4) {
            tokens.push(Token::new(m.as_str(), TokenKind::Boolean));
        } else if let Some(m) = caps.get(5) {
            tokens.push(Token::new(m.as_str(), TokenKind::Punctuation));
        }
        last = whole.end();
    }
    if last < line.len() {
        tokens.push(Token::new(&line[last..], TokenKind::Plain));
    }
    tokens
}

fn tokenize_yaml(line: &str) -> Vec<Token> {
    if line.trim_start().starts_with('#') {
        return vec![Token::new(line, TokenKind::Comment)];
    }
    let Some((key, rest)) = line.split_once(':') else {
        return vec![Token::new(line, TokenKind::Plain)];
    };

    let value = rest.trim();
    let kind = if value.is_empty() {
        TokenKind::Plain
    } else if value == "true" || value == "false" {
        TokenKind::Boolean
    } else if decimal_regex().is_match(value) {
        TokenKind::Number
    } else {
        TokenKind::String
    };
    vec![
        Token::new(key, TokenKind::Key),
        Token::new(":", TokenKind::Punctuation),
        Token::new(rest, kind),
    ]
}
