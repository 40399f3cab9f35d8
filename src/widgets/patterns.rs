//! Pattern fields: testing against sample text and named pattern presets.
//!
//! Regex fields hold one pattern; code-finder fields hold a `#v1` rule
//! block. Patterns that do not compile test as `None` rather than failing.

use regex_lite::Regex;
use serde::Serialize;
use serde_json::Value;

use okapi_codec::code_finder::{parse_rules, serialize_rules};

use super::WidgetKind;

/// Outcome of testing one pattern against a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternTest {
    /// Rule number inside a code-finder block; 0 for a single pattern.
    pub index: usize,
    pub pattern: String,
    /// `None` when the pattern does not compile.
    pub matched: Option<bool>,
}

/// Whether `pattern` matches anywhere in `sample`.
pub fn test_pattern(pattern: &str, sample: &str) -> Option<bool> {
    Regex::new(pattern).ok().map(|re| re.is_match(sample))
}

/// Test every rule of a code-finder block against `sample`.
pub fn test_rules(block: &str, sample: &str) -> Vec<PatternTest> {
    parse_rules(block)
        .into_iter()
        .enumerate()
        .map(|(index, pattern)| PatternTest {
            index,
            matched: test_pattern(&pattern, sample),
            pattern,
        })
        .collect()
}

/// Append a rule to a code-finder block.
pub fn add_rule(block: &str, pattern: &str) -> String {
    let mut rules = parse_rules(block);
    rules.push(pattern.to_string());
    serialize_rules(&rules)
}

/// Drop the rule at `index`; out-of-range indices leave the block as is.
pub fn remove_rule(block: &str, index: usize) -> String {
    let mut rules = parse_rules(block);
    if index >= rules.len() {
        return block.to_string();
    }
    rules.remove(index);
    serialize_rules(&rules)
}

/// Field value after picking a named pattern: a rule block gains a rule,
/// any other field takes the pattern as its value.
pub fn apply_pattern(kind: WidgetKind, current: &Value, pattern: &str) -> Value {
    match kind {
        WidgetKind::CodeFinderRules => {
            Value::String(add_rule(current.as_str().unwrap_or_default(), pattern))
        }
        _ => Value::String(pattern.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_pattern() {
        assert_eq!(test_pattern(r"^\d+$", "1234"), Some(true));
        assert_eq!(test_pattern(r"^\d+$", "12a"), Some(false));
        assert_eq!(test_pattern("(unclosed", "anything"), None);
    }

    #[test]
    fn test_each_rule_is_tested() {
        let block = "#v1\ncount.i=3\nrule0=<[^>]+>\nrule1=(bad\nrule2=%s";
        let results = test_rules(block, "Hello <b>world</b>");
        let matched: Vec<Option<bool>> = results.iter().map(|r| r.matched).collect();
        assert_eq!(matched, vec![Some(true), None, Some(false)]);
        assert_eq!(results[2].index, 2);
        assert_eq!(results[2].pattern, "%s");
        assert!(test_rules("", "x").is_empty());
    }

    #[test]
    fn test_add_and_remove_rules() {
        assert_eq!(add_rule("", r"\{\d+\}"), "#v1\ncount.i=1\nrule0=\\{\\d+\\}");
        let block = add_rule("#v1\ncount.i=1\nrule0=a", "b");
        assert_eq!(block, "#v1\ncount.i=2\nrule0=a\nrule1=b");
        assert_eq!(remove_rule(&block, 0), "#v1\ncount.i=1\nrule0=b");
        assert_eq!(remove_rule(&block, 9), block);
        assert_eq!(remove_rule("#v1\ncount.i=1\nrule0=a", 0), "");
    }

    #[test]
    fn test_apply_pattern_by_widget() {
        assert_eq!(
            apply_pattern(WidgetKind::RegexBuilder, &json!("old"), "^id$"),
            json!("^id$")
        );
        assert_eq!(
            apply_pattern(WidgetKind::CodeFinderRules, &json!("#v1\ncount.i=1\nrule0=a"), "b"),
            json!("#v1\ncount.i=2\nrule0=a\nrule1=b")
        );
        assert_eq!(
            apply_pattern(WidgetKind::CodeFinderRules, &Value::Null, "a"),
            json!("#v1\ncount.i=1\nrule0=a")
        );
    }
}
