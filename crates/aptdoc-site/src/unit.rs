//! Documented units and their sources.
//!
//! Discovering annotated code is the job of an external metadata provider.
//! Its output reaches the generator through [`UnitSource`]; the bundled
//! [`JsonUnitSource`] reads a manifest of the form:
//!
//! ```json
//! {
//!   "units": [
//!     {
//!       "name": "ch.puzzle.example.LoginUseCase",
//!       "namespace": "ch.puzzle.example",
//!       "tags": [{ "name": "@description", "text": "Logs the user in." }],
//!       "annotations": [
//!         {
//!           "kind": "ch.puzzle.annotations.UseCase",
//!           "arguments": [{ "name": "id", "value": "\"UC-001\"" }]
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use aptdoc_renderer::{AnnotationArgument, Tag};
use serde::{Deserialize, Serialize};

/// A class or method carrying documentation annotations.
///
/// Method units use the namespace of their declaring class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentedUnit {
    /// Qualified name of the unit, used in diagnostics.
    pub name: String,
    /// Dotted namespace (package) of the unit.
    #[serde(default)]
    pub namespace: String,
    /// Doc-comment tags in declaration order.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Annotations in declaration order.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// One annotation on a documented unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Qualified annotation type; selects the template.
    pub kind: String,
    /// Explicitly given annotation arguments.
    #[serde(default)]
    pub arguments: Vec<AnnotationArgument>,
}

/// Error returned when units cannot be obtained from a source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Manifest file not found.
    #[error("Unit manifest not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error reading the manifest.
    #[error("Failed to read unit manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Manifest is not valid JSON or does not match the expected shape.
    #[error("Invalid unit manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplier of documented units.
pub trait UnitSource {
    /// All units to document, in processing order.
    fn units(&self) -> Result<Vec<DocumentedUnit>, SourceError>;
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    units: Vec<DocumentedUnit>,
}

/// [`UnitSource`] reading a JSON manifest file.
#[derive(Clone, Debug)]
pub struct JsonUnitSource {
    path: PathBuf,
}

impl JsonUnitSource {
    /// Create a source for the manifest at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manifest location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UnitSource for JsonUnitSource {
    fn units(&self) -> Result<Vec<DocumentedUnit>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(self.path.clone())
            } else {
                SourceError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(
            path = %self.path.display(),
            units = manifest.units.len(),
            "loaded unit manifest"
        );
        Ok(manifest.units)
    }
}

/// Directory path for a dotted namespace (`a.b.c` becomes `a/b/c`).
#[must_use]
pub fn namespace_path(namespace: &str) -> PathBuf {
    namespace
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect()
}
