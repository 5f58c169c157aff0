//! Annotation-driven APT template rendering.
//!
//! This crate turns the metadata of one documented unit (its doc-comment tags
//! and annotation arguments) plus a template into a resolved APT document.
//!
//! # Architecture
//!
//! - [`ReplacementMap`]: flat key/value table built from tags and arguments
//! - [`Directive`]: classifies template lines as screencast, images or plain
//! - [`substitute_placeholders`]: `${key}` replacement with table-cell collapsing
//! - [`MediaEmbedder`]: resolves screencast and image directives on disk
//! - [`TemplateRenderer`]: line-by-line pass tracking `~~{table}` regions
//!
//! Rendering never fails: missing keys resolve to the empty string and
//! missing media resolve to the `n/a` marker.
//!
//! # Example
//!
//! ```
//! use aptdoc_renderer::{AnnotationArgument, ReplacementMap, Tag, Template, TemplateRenderer};
//!
//! let replacements = ReplacementMap::resolve(
//!     &[Tag::new("@description", "Logs the user in.")],
//!     &[AnnotationArgument::new("id", "\"UC-001\"")],
//! );
//! let template = Template::parse("${id}\n\n  ${description}");
//! let document = TemplateRenderer::new("src/site/resources").render(&template, &replacements);
//!
//! assert_eq!(document, "UC-001\n\n  Logs the user in.\n");
//! ```

mod directive;
mod keys;
mod media;
mod substitute;
mod template;

pub use directive::{Directive, TABLE_END_MARKER, TABLE_START_MARKER};
pub use keys::{AnnotationArgument, ReplacementMap, Tag};
pub use media::{MediaEmbedder, NOT_AVAILABLE, SUPPORTED_VIDEO_TYPES};
pub use substitute::{collapse_whitespace, substitute_placeholders};
pub use template::{Template, TemplateRenderer, fallback_document};
