use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Delimiter used when no explicit one is configured.
pub const DEFAULT_DELIMITER: char = ',';

/// The canonical ordered, deduplicated list of tags parsed from one tag
/// file. Invariants: no duplicate tag (case-sensitive exact match), tokens
/// trimmed, no empty tokens, no control characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    pub(crate) tags: Vec<String>,
}

impl TagSet {
    /// Parse raw tag text. Splits on `delimiter` and on line breaks (the
    /// downloader writes one tag per line), trims each token, drops empty
    /// tokens, strips remaining control characters, and deduplicates
    /// keeping first-occurrence order.
    pub fn parse(raw: &str, delimiter: char) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut tags = Vec::new();

        for token in raw.split(|c: char| c == delimiter || c == '\n' || c == '\r') {
            let cleaned: String = token.chars().filter(|c| !c.is_control()).collect();
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                continue;
            }
            if seen.insert(cleaned.to_string()) {
                tags.push(cleaned.to_string());
            }
        }

        Self { tags }
    }

    /// Serialize back to file content: tags joined with `"<delimiter> "`
    /// and a single trailing newline. An empty set serializes to an empty
    /// string.
    pub fn serialize(&self, delimiter: char) -> String {
        if self.tags.is_empty() {
            return String::new();
        }
        let mut separator = String::with_capacity(2);
        separator.push(delimiter);
        separator.push(' ');
        format!("{}\n", self.tags.join(&separator))
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// The original tool's stylistic pass: `_` and `-` become spaces and
    /// unescaped parentheses get backslash-escaped (prompt syntax treats
    /// bare parens as weighting). Re-deduplicates, since separator
    /// replacement can collapse distinct tokens.
    pub fn standardized(&self) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut tags = Vec::new();

        for tag in &self.tags {
            let spaced = tag.replace(['_', '-'], " ");
            let escaped = escape_parens(spaced.trim());
            if escaped.is_empty() {
                continue;
            }
            if seen.insert(escaped.clone()) {
                tags.push(escaped);
            }
        }

        Self { tags }
    }
}

/// Normalize raw tag text: parse then serialize. Pure and idempotent;
/// already-canonical input round-trips byte-identically.
pub fn normalize(raw: &str, delimiter: char) -> String {
    TagSet::parse(raw, delimiter).serialize(delimiter)
}

/// Backslash-escape parentheses that are not already escaped.
fn escape_parens(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut prev = None;
    for c in tag.chars() {
        if (c == '(' || c == ')') && prev != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_trims_and_drops_empty_tokens() {
        let set = TagSet::parse("  1girl ,, solo ,  ", ',');
        assert_eq!(set.tags(), ["1girl", "solo"]);
    }

    #[test]
    fn test_parse_deduplicates_preserving_first_occurrence() {
        let set = TagSet::parse("a, b, a, c, b", ',');
        assert_eq!(set.tags(), ["a", "b", "c"]);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let set = TagSet::parse("Cat, cat", ',');
        assert_eq!(set.tags(), ["Cat", "cat"]);
    }

    #[test]
    fn test_parse_splits_on_line_breaks() {
        let set = TagSet::parse("1girl\nsolo\r\nlong hair", ',');
        assert_eq!(set.tags(), ["1girl", "solo", "long hair"]);
    }

    #[test]
    fn test_parse_strips_control_characters() {
        let set = TagSet::parse("a\tb, c\u{0}d", ',');
        assert_eq!(set.tags(), ["ab", "cd"]);
    }

    #[test]
    fn test_serialize_joins_with_delimiter_and_space() {
        let set = TagSet::parse("a,b,c", ',');
        assert_eq!(set.serialize(','), "a, b, c\n");
    }

    #[test]
    fn test_serialize_empty_set() {
        assert_eq!(TagSet::default().serialize(','), "");
        assert_eq!(normalize("   \n  ", ','), "");
    }

    #[test]
    fn test_normalize_canonical_input_round_trips() {
        let canonical = "1girl, solo, long hair\n";
        assert_eq!(normalize(canonical, ','), canonical);
    }

    #[test]
    fn test_custom_delimiter() {
        let set = TagSet::parse("a; b;c", ';');
        assert_eq!(set.serialize(';'), "a; b; c\n");
    }

    #[test]
    fn test_standardized_replaces_separators_and_escapes_parens() {
        let set = TagSet::parse("bad_anatomy, blue-eyes, smile (happy)", ',');
        let standardized = set.standardized();
        assert_eq!(
            standardized.tags(),
            ["bad anatomy", "blue eyes", r"smile \(happy\)"]
        );
    }

    #[test]
    fn test_standardized_leaves_escaped_parens_alone() {
        let set = TagSet::parse(r"smile \(happy\)", ',');
        let once = set.standardized();
        assert_eq!(once.tags(), [r"smile \(happy\)"]);
        assert_eq!(once.standardized(), once);
    }

    #[test]
    fn test_standardized_collapses_newly_equal_tokens() {
        let set = TagSet::parse("long_hair, long hair", ',');
        assert_eq!(set.standardized().tags(), ["long hair"]);
    }

    proptest! {
        #[test]
        fn normalize_is_a_projection(raw in ".*") {
            let once = normalize(&raw, DEFAULT_DELIMITER);
            let twice = normalize(&once, DEFAULT_DELIMITER);
            prop_assert_eq!(once, twice);
        }
    }
}
