//! Token scanner
//!
//! Tokens are `{{name}}` or `{{name:modifier}}` placeholders in a paragraph's flattened text.
//! Names match case-insensitively; the modifier is restricted to `[0-9a-zA-Z_-]*` and is only
//! consumed by images, as a target pixel width.
//!
//! The scanner never caches positions: callers re-flatten the paragraph and search again
//! after every edit, because each substitution shifts everything behind it.

use super::error::{MergeError, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

/// Any placeholder, used to report what is left in a document
static ANY_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([^{}:]+)(?::([0-9a-zA-Z_-]*))?\}\}").expect("static token regex")
});

/// Compiled search pattern for one token name
#[derive(Debug, Clone)]
pub struct TokenPattern {
    name: String,
    regex: Regex,
}

/// A located token occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    /// Byte span of the whole `{{...}}` in the flattened text
    pub span: Range<usize>,
    pub modifier: Option<String>,
}

impl TokenMatch {
    /// The modifier read as a pixel width; non-numeric modifiers yield `None`.
    pub fn width(&self) -> Option<u32> {
        self.modifier.as_deref().and_then(|m| m.parse().ok())
    }
}

impl TokenPattern {
    /// Build the pattern for a binding key. Surrounding braces are trimmed, so `{{name}}` and
    /// `name` produce the same pattern.
    pub fn new(key: &str) -> Result<Self> {
        let name = key.trim_matches(|c| c == '{' || c == '}').to_string();
        let pattern = format!(
            r"\{{\{{{}(?::([0-9a-zA-Z_-]*))?\}}\}}",
            regex::escape(&name)
        );
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| MergeError::InvalidToken {
                token: name.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { name, regex })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First occurrence in `text`, searching from the start.
    pub fn find(&self, text: &str) -> Option<TokenMatch> {
        let caps = self.regex.captures(text)?;
        let whole = caps.get(0)?;
        Some(TokenMatch {
            span: whole.range(),
            modifier: caps.get(1).map(|m| m.as_str().to_string()),
        })
    }
}

/// All placeholders in `text` as `(name, modifier)` pairs, in order of appearance.
pub fn placeholders(text: &str) -> Vec<(String, Option<String>)> {
    ANY_TOKEN
        .captures_iter(text)
        .map(|caps| {
            (
                caps[1].to_string(),
                caps.get(2).map(|m| m.as_str().to_string()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hello {{name}}!", Some(6..14))]
    #[case("Hello {{NAME}}!", Some(6..14))]
    #[case("{{Name:120}}", Some(0..12))]
    #[case("{{name:w_1-x}} tail", Some(0..14))]
    #[case("{{name:12.5}}", None)]
    #[case("{{names}}", None)]
    #[case("{name}", None)]
    #[case("{{{{name}}", Some(2..10))]
    fn test_find(#[case] text: &str, #[case] expected: Option<Range<usize>>) {
        let pattern = TokenPattern::new("name").unwrap();
        assert_eq!(pattern.find(text).map(|m| m.span), expected);
    }

    #[test]
    fn test_modifier_and_width() {
        let pattern = TokenPattern::new("logo").unwrap();
        let m = pattern.find("{{logo:300}}").unwrap();
        assert_eq!(m.modifier.as_deref(), Some("300"));
        assert_eq!(m.width(), Some(300));

        let m = pattern.find("{{logo:wide}}").unwrap();
        assert_eq!(m.width(), None);

        let m = pattern.find("{{logo}}").unwrap();
        assert_eq!(m.modifier, None);
    }

    #[test]
    fn test_braced_key_and_regex_characters() {
        let pattern = TokenPattern::new("{{total.amount}}").unwrap();
        assert_eq!(pattern.name(), "total.amount");
        assert!(pattern.find("{{total.amount}}").is_some());
        assert!(pattern.find("{{totalXamount}}").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let pattern = TokenPattern::new("a").unwrap();
        assert_eq!(pattern.find("{{a}} and {{a}}").map(|m| m.span), Some(0..5));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("{{a}} x {{b:40}} {{}}"),
            vec![
                ("a".to_string(), None),
                ("b".to_string(), Some("40".to_string()))
            ]
        );
    }
}
