//! Batch document generation.
//!
//! For every unit and every annotation whose kind has a configured template,
//! the generator resolves the unit's replacement map, renders the template and
//! writes `<output>/<namespace path>/<id>.apt`. Failures are collected per
//! document; one broken unit never stops the batch.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use aptdoc_renderer::{ReplacementMap, Template, TemplateRenderer, fallback_document};

use crate::unit::{Annotation, DocumentedUnit, namespace_path};

/// Explicit generator configuration.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Base output directory; namespaces become sub-directories.
    pub output_dir: PathBuf,
    /// Site resources directory (screencasts, images, generated snippets).
    pub resources_dir: PathBuf,
    /// Annotation kind to template path.
    pub annotations: BTreeMap<String, PathBuf>,
}

/// Error producing a single document.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The annotation kind has no configured template.
    #[error("No template configured for annotation {0}")]
    UnconfiguredKind(String),
    /// The unit has no `id`, so the output file cannot be named.
    #[error("Missing id: the annotation has no `id` argument or tag")]
    MissingId,
    /// Writing the output document failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A document written by the generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedDocument {
    /// Annotation kind the document was rendered for.
    pub kind: String,
    /// Resolved unit id (the file stem).
    pub id: String,
    /// Value of the `name` key, if the unit has one.
    pub title: Option<String>,
    /// Dotted namespace of the unit.
    pub namespace: String,
    /// Path of the written `.apt` file.
    pub path: PathBuf,
    /// Whether the template was unreadable and the fallback document was written.
    pub used_fallback: bool,
}

/// A document that could not be produced.
#[derive(Debug)]
pub struct UnitFailure {
    /// Qualified name of the unit.
    pub unit: String,
    /// Annotation kind being rendered.
    pub kind: String,
    /// What went wrong.
    pub error: GenerateError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Documents written, in processing order.
    pub documents: Vec<GeneratedDocument>,
    /// Documents that failed, in processing order.
    pub failures: Vec<UnitFailure>,
}

impl GenerateReport {
    /// Number of documents written from the fallback layout.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.documents.iter().filter(|d| d.used_fallback).count()
    }
}

/// Renders documented units into APT files.
pub struct SiteGenerator {
    config: GeneratorConfig,
    renderer: TemplateRenderer,
}

impl SiteGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let renderer = TemplateRenderer::new(config.resources_dir.clone());
        Self { config, renderer }
    }

    /// Generator configuration.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Output folder for documents of `unit`.
    #[must_use]
    pub fn destination_folder(&self, unit: &DocumentedUnit) -> PathBuf {
        self.config.output_dir.join(namespace_path(&unit.namespace))
    }

    /// Render every configured annotation of every unit.
    ///
    /// Annotations of unconfigured kinds are ignored.
    pub fn generate(&self, units: &[DocumentedUnit]) -> GenerateReport {
        let mut report = GenerateReport::default();

        for unit in units {
            for annotation in &unit.annotations {
                if !self.config.annotations.contains_key(&annotation.kind) {
                    continue;
                }
                match self.generate_unit(unit, annotation) {
                    Ok(document) => report.documents.push(document),
                    Err(error) => {
                        tracing::warn!(
                            unit = %unit.name,
                            kind = %annotation.kind,
                            "document not generated: {error}"
                        );
                        report.failures.push(UnitFailure {
                            unit: unit.name.clone(),
                            kind: annotation.kind.clone(),
                            error,
                        });
                    }
                }
            }
        }

        tracing::info!(
            documents = report.documents.len(),
            failures = report.failures.len(),
            "generation finished"
        );
        report
    }

    /// Render and write the document for one annotation of `unit`.
    ///
    /// An unreadable template degrades to [`fallback_document`].
    ///
    /// # Errors
    ///
    /// Returns `GenerateError::UnconfiguredKind` if the annotation kind has no
    /// template, `GenerateError::MissingId` if the unit has no id and
    /// `GenerateError::Io` if the document cannot be written.
    pub fn generate_unit(
        &self,
        unit: &DocumentedUnit,
        annotation: &Annotation,
    ) -> Result<GeneratedDocument, GenerateError> {
        let template_path = self
            .config
            .annotations
            .get(&annotation.kind)
            .ok_or_else(|| GenerateError::UnconfiguredKind(annotation.kind.clone()))?;

        let replacements = ReplacementMap::resolve(&unit.tags, &annotation.arguments);
        let id = replacements.id().ok_or(GenerateError::MissingId)?.to_owned();

        let folder = self.destination_folder(unit);
        fs::create_dir_all(&folder).map_err(|source| GenerateError::Io {
            path: folder.clone(),
            source,
        })?;
        let path = folder.join(format!("{id}.apt"));

        let (content, used_fallback) = self.render_content(template_path, &replacements, unit);
        fs::write(&path, content).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), fallback = used_fallback, "generated document");

        let title = replacements
            .contains_key("name")
            .then(|| replacements.get("name").to_owned());

        Ok(GeneratedDocument {
            kind: annotation.kind.clone(),
            id,
            title,
            namespace: unit.namespace.clone(),
            path,
            used_fallback,
        })
    }

    fn render_content(
        &self,
        template_path: &Path,
        replacements: &ReplacementMap,
        unit: &DocumentedUnit,
    ) -> (String, bool) {
        match Template::load(template_path) {
            Ok(template) => (self.renderer.render(&template, replacements), false),
            Err(e) => {
                tracing::warn!(
                    template = %template_path.display(),
                    unit = %unit.name,
                    "template not readable, writing fallback document: {e}"
                );
                (fallback_document(replacements, &unit.tags), true)
            }
        }
    }
}
