//! Code-finder rule blocks.
//!
//! Inline-code rules are stored as a nested `#v1` block inside a single
//! string parameter:
//!
//! ```text
//! #v1
//! count.i=2
//! rule0=<pattern>
//! rule1=<pattern>
//! ```

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::native::HEADER;

fn rule_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^rule(\d+)=(.*)$").expect("static regex"))
}

/// Patterns of every `ruleN=` line, in the order they appear.
pub fn parse_rules(block: &str) -> Vec<String> {
    block
        .lines()
        .filter_map(|line| rule_regex().captures(line.trim_end_matches('\r')))
        .filter_map(|caps| caps.get(2).map(|m| m.as_str().to_string()))
        .collect()
}

/// Serialize patterns back into a rule block; no rules → empty string.
pub fn serialize_rules<S: AsRef<str>>(rules: &[S]) -> String {
    if rules.is_empty() {
        return String::new();
    }
    let mut lines = vec![HEADER.to_string(), format!("count.i={}", rules.len())];
    for (index, rule) in rules.iter().enumerate() {
        lines.push(format!("rule{}={}", index, rule.as_ref()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules() {
        let block = "#v1\ncount.i=2\nrule0=</?[a-z]+>\nrule1=%\\d+\\$s\nsample=x";
        assert_eq!(parse_rules(block), vec!["</?[a-z]+>", "%\\d+\\$s"]);
        assert!(parse_rules("").is_empty());
    }

    #[test]
    fn test_serialize_rules() {
        assert_eq!(serialize_rules::<&str>(&[]), "");
        assert_eq!(
            serialize_rules(&["\\{\\d+\\}"]),
            "#v1\ncount.i=1\nrule0=\\{\\d+\\}"
        );
    }

    #[test]
    fn test_parse_serialized_block() {
        let rules = vec!["a+".to_string(), "b=c".to_string()];
        assert_eq!(parse_rules(&serialize_rules(&rules)), rules);
    }
}
