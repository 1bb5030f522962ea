//! Text normalization and offset conversion
//!
//! Every span produced downstream is relative to the output of
//! [`normalize`], never to the raw input. Internally spans are byte
//! offsets; [`CharIndex`] converts them to and from the character offsets
//! used by recognizers and reported to callers.

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip markup tags, collapse whitespace runs to one space, and trim.
pub fn normalize(raw: &str) -> String {
    let stripped = MARKUP_TAG.replace_all(raw, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Byte offset of every character boundary of one string.
#[derive(Debug, Clone)]
pub struct CharIndex {
    boundaries: Vec<usize>,
}

impl CharIndex {
    pub fn new(text: &str) -> Self {
        let boundaries = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { boundaries }
    }

    /// Number of characters in the indexed text.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Byte offset of character offset `char_offset`, if within the text.
    pub fn to_byte(&self, char_offset: usize) -> Option<usize> {
        self.boundaries.get(char_offset).copied()
    }

    /// Character offset of `byte_offset`, if it is a char boundary.
    pub fn to_char(&self, byte_offset: usize) -> Option<usize> {
        self.boundaries.binary_search(&byte_offset).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_index() {
        let index = CharIndex::new("aé€b");
        assert_eq!(index.char_len(), 4);
        assert_eq!(index.to_byte(0), Some(0));
        assert_eq!(index.to_byte(2), Some(3));
        assert_eq!(index.to_byte(4), Some(7));
        assert_eq!(index.to_byte(5), None);
        assert_eq!(index.to_char(6), Some(3));
        assert_eq!(index.to_char(2), None);
    }

    #[test]
    fn test_char_index_empty() {
        let index = CharIndex::new("");
        assert_eq!(index.char_len(), 0);
        assert_eq!(index.to_byte(0), Some(0));
        assert_eq!(index.to_char(0), Some(0));
    }

    #[test]
    fn test_strips_tags() {
        assert_eq!(normalize("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  a\t\tb\n\nc  "), "a b c");
    }

    #[test]
    fn test_multiline_tag() {
        assert_eq!(normalize("x<div\nclass=\"y\">z"), "xz");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
        assert_eq!(normalize("<br>"), "");
    }

    #[test]
    fn test_lone_angle_brackets_kept() {
        assert_eq!(normalize("a <> b"), "a <> b");
        assert_eq!(normalize("3 < 4"), "3 < 4");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "plain text",
            "<html><body>Dear team,\n\nMy card 4111 1111 1111 1111</body></html>",
            "<<a>b>  c",
            "a < b > c\r\n d",
            "  \u{00a0}non-breaking\u{2003}space ",
            "<>< >",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }
}
