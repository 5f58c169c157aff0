//! Template loading and the line-by-line rendering pass.

use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};

use crate::directive::{Directive, TABLE_END_MARKER, TABLE_START_MARKER};
use crate::keys::{ReplacementMap, Tag};
use crate::media::MediaEmbedder;
use crate::substitute::substitute_placeholders;

/// A documentation template: ordered text lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Template {
    lines: Vec<String>,
}

impl Template {
    /// Parse template text into lines.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    /// Read a template from disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded template");
        Ok(Self::parse(&text))
    }

    /// Template lines in order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Renders templates against a [`ReplacementMap`].
///
/// # Example
///
/// ```
/// use aptdoc_renderer::{ReplacementMap, Template, TemplateRenderer};
///
/// let replacements: ReplacementMap =
///     [("steps", "open\n  the page")].into_iter().collect();
/// let template = Template::parse("~~{table}\n| ${steps} |\n~~{/table}\n${steps}");
/// let output = TemplateRenderer::new("resources").render(&template, &replacements);
///
/// assert_eq!(output, "~~{table}\n| open the page |\n~~{/table}\nopen\n  the page\n");
/// ```
#[derive(Clone, Debug)]
pub struct TemplateRenderer {
    embedder: MediaEmbedder,
}

impl TemplateRenderer {
    /// Create a renderer resolving media below `resources_dir`.
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self::with_embedder(MediaEmbedder::new(resources_dir))
    }

    /// Create a renderer around an existing embedder.
    #[must_use]
    pub fn with_embedder(embedder: MediaEmbedder) -> Self {
        Self { embedder }
    }

    /// The media embedder used for directives.
    #[must_use]
    pub fn embedder(&self) -> &MediaEmbedder {
        &self.embedder
    }

    /// Render a whole template. Every output line ends with `\n`.
    ///
    /// A line containing [`TABLE_START_MARKER`] opens a table region and a
    /// line containing [`TABLE_END_MARKER`] closes it; regions do not nest.
    #[must_use]
    pub fn render(&self, template: &Template, replacements: &ReplacementMap) -> String {
        let mut output = String::new();
        let mut inside_table = false;

        for line in template.lines() {
            if line.contains(TABLE_START_MARKER) {
                inside_table = true;
            } else if line.contains(TABLE_END_MARKER) {
                inside_table = false;
            }
            output.push_str(&self.resolve_line(line, inside_table, replacements));
            output.push('\n');
        }

        output
    }

    /// Resolve one template line.
    ///
    /// A screencast or images directive replaces the whole line with the
    /// embedder's output; otherwise placeholders are substituted in place.
    #[must_use]
    pub fn resolve_line(
        &self,
        line: &str,
        inside_table: bool,
        replacements: &ReplacementMap,
    ) -> String {
        match Directive::match_line(line) {
            Some(Directive::Screencast(text)) => {
                self.embedder.embed_screencast(text, replacements)
            }
            Some(Directive::Images(text)) => self.embedder.embed_images(text, replacements),
            None => substitute_placeholders(line, replacements, inside_table),
        }
    }
}

/// Minimal document used when a unit's template cannot be read.
///
/// Consists of the unit id followed by one APT bullet per tag.
#[must_use]
pub fn fallback_document(replacements: &ReplacementMap, tags: &[Tag]) -> String {
    let mut document = replacements.get("id").to_owned();
    for tag in tags {
        let _ = write!(document, "\n\n* {}\n\n  {}", tag.name, tag.text);
    }
    document
}
