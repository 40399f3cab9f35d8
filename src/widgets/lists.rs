//! Delimited-list fields (tag lists, column index lists, delimiters).

/// Separator used when a field hint does not name one.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Well-known delimiters and their labels.
pub const COMMON_DELIMITERS: &[(&str, &str)] = &[
    (",", "Comma"),
    ("\t", "Tab"),
    (";", "Semicolon"),
    ("|", "Pipe"),
    (" ", "Space"),
];

/// Split a tag list, trimming entries and dropping empty ones.
pub fn split_tags<'a>(value: &'a str, separator: &str) -> Vec<&'a str> {
    if value.is_empty() {
        return Vec::new();
    }
    value
        .split(separator)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Add a tag unless it is blank or already present.
pub fn add_tag(value: &str, tag: &str, separator: &str) -> String {
    let mut tags = split_tags(value, separator);
    let tag = tag.trim();
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
    tags.join(separator)
}

/// Remove the tag at `index`; out-of-range indices leave the list as is.
pub fn remove_tag(value: &str, index: usize, separator: &str) -> String {
    let mut tags = split_tags(value, separator);
    if index < tags.len() {
        tags.remove(index);
    }
    tags.join(separator)
}

/// Column indices of a column list, skipping entries that are not integers.
pub fn parse_columns(value: &str, separator: &str) -> Vec<i64> {
    split_tags(value, separator)
        .into_iter()
        .filter_map(|entry| entry.parse().ok())
        .collect()
}

/// Entries of a column list that are not integers.
pub fn invalid_columns<'a>(value: &'a str, separator: &str) -> Vec<&'a str> {
    split_tags(value, separator)
        .into_iter()
        .filter(|entry| entry.parse::<i64>().is_err())
        .collect()
}

/// Add a column, keeping the list sorted and free of duplicates.
pub fn add_column(value: &str, column: i64, separator: &str) -> String {
    let mut columns = parse_columns(value, separator);
    if !columns.contains(&column) {
        columns.push(column);
        columns.sort_unstable();
    }
    columns
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Label of a well-known delimiter, or `Custom: "<value>"`.
pub fn delimiter_label(value: &str) -> String {
    COMMON_DELIMITERS
        .iter()
        .find(|(delimiter, _)| *delimiter == value)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| format!("Custom: {:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(" a, b ,,c ", ","), vec!["a", "b", "c"]);
        assert!(split_tags("", ",").is_empty());
        assert_eq!(split_tags("x;y", ";"), vec!["x", "y"]);
    }

    #[test]
    fn test_add_and_remove_tag() {
        assert_eq!(add_tag("a,b", " c ", ","), "a,b,c");
        assert_eq!(add_tag("a,b", "a", ","), "a,b");
        assert_eq!(add_tag("", "x", ","), "x");
        assert_eq!(remove_tag("a,b,c", 1, ","), "a,c");
        assert_eq!(remove_tag("a", 0, ","), "");
        assert_eq!(remove_tag("a", 5, ","), "a");
    }

    #[test]
    fn test_columns() {
        assert_eq!(parse_columns("3, 1,x,2", ","), vec![3, 1, 2]);
        assert_eq!(invalid_columns("3, 1,x,2", ","), vec!["x"]);
        assert_eq!(add_column("3,1", 2, ","), "1,2,3");
        assert_eq!(add_column("1,2", 2, ","), "1,2");
    }

    #[test]
    fn test_delimiter_label() {
        assert_eq!(delimiter_label("\t"), "Tab");
        assert_eq!(delimiter_label("#"), "Custom: \"#\"");
    }
}
