//! Replacement map construction from tags and annotation arguments.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Blank line followed by indentation, as left behind by doc-comment parsing.
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n\s+").unwrap());

/// Canonical paragraph separator inside APT list items.
const PARAGRAPH_SEPARATOR: &str = "\n\n  ";

/// A doc-comment tag of a documented unit (e.g. `@description`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    /// Tag name, usually including the leading `@`.
    pub name: String,
    /// Tag text as extracted from the doc comment.
    pub text: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A named argument of a documentation annotation (e.g. `id = "TC-001"`).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnotationArgument {
    /// Declared argument name.
    pub name: String,
    /// Argument value as written in source, possibly quoted.
    pub value: String,
}

impl AnnotationArgument {
    /// Create an annotation argument.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Resolved key/value table for rendering one documented unit.
///
/// Lookups never fail: a missing key reads as the empty string, so templates
/// can reference optional fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    values: HashMap<String, String>,
}

impl ReplacementMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for one unit.
    ///
    /// Tag names lose their leading `@` sigil and tag text has paragraph breaks
    /// normalized. Argument values lose all `"` characters and take
    /// precedence over tags with the same name.
    #[must_use]
    pub fn resolve(tags: &[Tag], arguments: &[AnnotationArgument]) -> Self {
        let mut map = Self::new();

        for tag in tags {
            let text = PARAGRAPH_BREAK.replace_all(&tag.text, PARAGRAPH_SEPARATOR);
            map.insert(tag.name.trim_start_matches('@'), text.into_owned());
        }

        for argument in arguments {
            map.insert(argument.name.clone(), argument.value.replace('"', ""));
        }

        map
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Value for `key`, or the empty string if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    /// Whether `key` has a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The unit identifier, if present and non-empty.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.values
            .get("id")
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReplacementMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
