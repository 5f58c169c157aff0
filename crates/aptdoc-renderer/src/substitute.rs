//! Placeholder substitution.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::keys::ReplacementMap;

/// `${key}` placeholder; group 1 is the key.
pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run (spaces, tabs, newlines) to a single space.
///
/// APT table cells cannot span lines.
///
/// ```
/// use aptdoc_renderer::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("a\n\n  b\tc"), "a b c");
/// ```
#[must_use]
pub fn collapse_whitespace(value: &str) -> Cow<'_, str> {
    WHITESPACE.replace_all(value, " ")
}

/// Replace every `${key}` token in `line` with its value.
///
/// Tokens are collected from `line` in order of first appearance and each one
/// is replaced literally in the accumulated result, so a value containing a
/// later token of the same line is resolved as well. Missing keys resolve to
/// the empty string. With `inside_table` set, values are passed through
/// [`collapse_whitespace`] first.
///
/// ```
/// use aptdoc_renderer::{ReplacementMap, substitute_placeholders};
///
/// let replacements: ReplacementMap = [("name", "Login")].into_iter().collect();
/// assert_eq!(
///     substitute_placeholders("* ${name} (${missing})", &replacements, false),
///     "* Login ()"
/// );
/// ```
#[must_use]
pub fn substitute_placeholders(
    line: &str,
    replacements: &ReplacementMap,
    inside_table: bool,
) -> String {
    let mut tokens: Vec<(&str, &str)> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(line) {
        let (Some(token), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !tokens.iter().any(|(seen, _)| *seen == token.as_str()) {
            tokens.push((token.as_str(), key.as_str()));
        }
    }

    let mut output = line.to_owned();
    for (token, key) in tokens {
        let value = replacements.get(key);
        output = if inside_table {
            output.replace(token, &collapse_whitespace(value))
        } else {
            output.replace(token, value)
        };
    }
    output
}
