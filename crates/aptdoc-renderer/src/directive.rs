//! Template directive matching.
//!
//! A template line carries at most one directive. Screencast directives take
//! precedence over image directives; lines with neither are plain
//! placeholder lines.

use std::sync::LazyLock;

use regex::Regex;

/// Marker opening a table region.
pub const TABLE_START_MARKER: &str = "~~{table}";

/// Marker closing a table region.
pub const TABLE_END_MARKER: &str = "~~{/table}";

/// `~~{screencast:<path>/${key}`: path segments followed by exactly one placeholder.
static SCREENCAST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~\{screencast:(/*[\w+_\-/])*\$\{\w+\}").unwrap());

/// `~~{images:<path>}` where the path may contain placeholders.
static IMAGES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~~\{images:(/*[\w+$\{\}]/*)+\}").unwrap());

/// A media directive found on a template line.
///
/// Carries the raw matched text, which may still contain `${key}` tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Embed a pre-recorded screencast.
    Screencast(&'a str),
    /// Embed every image of a resources sub-directory.
    Images(&'a str),
}

impl<'a> Directive<'a> {
    /// Find the directive on `line`, if any.
    #[must_use]
    pub fn match_line(line: &'a str) -> Option<Self> {
        if let Some(m) = SCREENCAST_PATTERN.find(line) {
            return Some(Self::Screencast(m.as_str()));
        }
        IMAGES_PATTERN
            .find(line)
            .map(|m| Self::Images(m.as_str()))
    }

    /// The matched directive text.
    #[must_use]
    pub fn text(&self) -> &'a str {
        match self {
            Self::Screencast(text) | Self::Images(text) => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screencast_directive() {
        let line = "anything before ~~{screencast:screencasts/${id}} anything after";
        assert_eq!(
            Directive::match_line(line),
            Some(Directive::Screencast("~~{screencast:screencasts/${id}"))
        );
    }

    #[test]
    fn test_images_directive_without_placeholder() {
        let line = "anything before ~~{images:/images/test} anything after";
        assert_eq!(
            Directive::match_line(line),
            Some(Directive::Images("~~{images:/images/test}"))
        );
    }

    #[test]
    fn test_images_directive_with_placeholder() {
        let line = "~~{images:/images/${param}}";
        let directive = Directive::match_line(line).unwrap();
        assert!(matches!(directive, Directive::Images(_)));
        assert_eq!(directive.text(), "~~{images:/images/${param}}");
    }

    #[test]
    fn test_screencast_takes_precedence() {
        let line = "~~{images:/images/test} ~~{screencast:screencasts/${id}}";
        assert!(matches!(
            Directive::match_line(line),
            Some(Directive::Screencast(_))
        ));
    }

    #[test]
    fn test_screencast_requires_placeholder() {
        assert_eq!(Directive::match_line("~~{screencast:screencasts/demo}"), None);
    }

    #[test]
    fn test_plain_line() {
        assert_eq!(Directive::match_line("* ${name}"), None);
        assert_eq!(Directive::match_line(TABLE_START_MARKER), None);
    }
}
