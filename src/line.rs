//! Classification of individual lines.
//!
//! A line is either dead (blank or commented out) or live. Independently of that, every line has a
//! *shape*: it looks like a section header, a property, or neither. Comment markers are ignored
//! when computing the shape, which lets the writer find sections and properties that were disabled
//! by commenting them out.

use once_cell::sync::Lazy;
use regex::Regex;

/// Markers that turn the rest of a line into a comment.
pub const COMMENT_MARKERS: [&str; 3] = [";", "#", "//"];

static SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[;#/\s]*\[.+\]$").expect("section header pattern is valid"));
static PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[;#/\s]*\w+\s*=").expect("property pattern is valid"));
static KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").expect("key pattern is valid"));

/// A line of text together with its 1-based position in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    #[must_use]
    pub fn new(number: usize, text: &'a str) -> Self {
        Self { number, text }
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        is_live(self.text)
    }

    #[must_use]
    pub fn kind(&self) -> LineKind {
        classify(self.text)
    }
}

/// Numbers each line of `text`, starting at 1.
pub fn numbered(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.lines()
        .enumerate()
        .map(|(i, text)| Line::new(i + 1, text))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Blank or commented out.
    Dead,
    SectionHeader,
    Property,
    Other,
}

/// Returns `true` if the line is neither blank nor a comment.
#[must_use]
pub fn is_live(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !COMMENT_MARKERS.iter().any(|m| line.starts_with(m))
}

#[must_use]
pub fn classify(line: &str) -> LineKind {
    if is_live(line) {
        shape(line)
    } else {
        LineKind::Dead
    }
}

/// Classifies the line as if any leading comment markers were absent.
///
/// Never returns [`LineKind::Dead`]; blank lines are [`LineKind::Other`].
#[must_use]
pub fn shape(line: &str) -> LineKind {
    let line = line.trim_end();

    if SECTION_HEADER.is_match(line) {
        LineKind::SectionHeader
    } else if PROPERTY.is_match(line) {
        LineKind::Property
    } else {
        LineKind::Other
    }
}

#[must_use]
pub fn strip_comment_markers(line: &str) -> &str {
    line.trim_start_matches(|c: char| matches!(c, ';' | '#' | '/') || c.is_whitespace())
}

/// Extracts the section name from a (possibly commented out) header line.
#[must_use]
pub fn section_name(line: &str) -> &str {
    let line = strip_comment_markers(line).trim();
    let line = line.strip_prefix('[').unwrap_or(line);
    let line = line.strip_suffix(']').unwrap_or(line);
    line.trim()
}

/// Extracts the key from a (possibly commented out) property line.
#[must_use]
pub fn property_key(line: &str) -> Option<&str> {
    let (key, _) = strip_comment_markers(line).split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then_some(key)
}

/// Splits a live property line on its first `=`.
///
/// Both halves are trimmed. Returns `None` if there is no `=` or the key is empty.
#[must_use]
pub fn split_property(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then(|| (key, value.trim()))
}

/// Returns `true` if `key` can be written back as a property that will be read again.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    KEY.is_match(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_dead() {
        for line in ["", "   ", "\t", "; note", "  # note", "// note", "//[Net]", ";key=value"] {
            assert_eq!(classify(line), LineKind::Dead, "{line:?}");
        }
    }

    #[test]
    fn live_lines() {
        assert_eq!(classify("[Net]"), LineKind::SectionHeader);
        assert_eq!(classify("  [ My Section ]  "), LineKind::SectionHeader);
        assert_eq!(classify("key=value"), LineKind::Property);
        assert_eq!(classify("key = a=b"), LineKind::Property);
        assert_eq!(classify("key ="), LineKind::Property);
        assert_eq!(classify("=value"), LineKind::Other);
        assert_eq!(classify("just words"), LineKind::Other);
        assert_eq!(classify("[]"), LineKind::Other);
    }

    #[test]
    fn shape_ignores_comment_markers() {
        assert_eq!(shape("; [Net]"), LineKind::SectionHeader);
        assert_eq!(shape("#;key=1"), LineKind::Property);
        assert_eq!(shape("// a comment"), LineKind::Other);
    }

    #[test]
    fn section_names_are_trimmed() {
        assert_eq!(section_name("[Net]"), "Net");
        assert_eq!(section_name("  [ Net ] "), "Net");
        assert_eq!(section_name("; [Net]"), "Net");
        assert_eq!(section_name("[ ]"), "");
    }

    #[test]
    fn keys_are_found_behind_comment_markers() {
        assert_eq!(property_key("timeout = 5"), Some("timeout"));
        assert_eq!(property_key(";timeout=5"), Some("timeout"));
        assert_eq!(property_key("// timeout =5"), Some("timeout"));
        assert_eq!(property_key("no equals"), None);
    }

    #[test]
    fn only_first_equal_splits() {
        assert_eq!(split_property("url = a=b=c "), Some(("url", "a=b=c")));
        assert_eq!(split_property("key="), Some(("key", "")));
        assert_eq!(split_property(" = value"), None);
        assert_eq!(split_property("value"), None);
    }

    #[test]
    fn numbering_starts_at_one() {
        let lines = numbered("a\r\nb\n").collect::<Vec<_>>();
        assert_eq!(lines, vec![Line::new(1, "a"), Line::new(2, "b")]);
    }
}
