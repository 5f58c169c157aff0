//! Batch generation of APT site documents.
//!
//! This crate provides:
//! - [`UnitSource`]: supplier of documented units ([`JsonUnitSource`] reads a manifest)
//! - [`SiteGenerator`]: renders every configured annotation to `<output>/<namespace>/<id>.apt`
//! - [`SiteDescriptorLink`]: Maven `site.xml` menu items for generated documents
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::collections::BTreeMap;
//! use std::path::PathBuf;
//! use aptdoc_site::{GeneratorConfig, JsonUnitSource, SiteGenerator, UnitSource};
//!
//! let mut annotations = BTreeMap::new();
//! annotations.insert(
//!     "ch.puzzle.annotations.UseCase".to_owned(),
//!     PathBuf::from("src/site/apt/templates/usecase.apt.template"),
//! );
//! let generator = SiteGenerator::new(GeneratorConfig {
//!     output_dir: PathBuf::from("target/generated-site/apt"),
//!     resources_dir: PathBuf::from("src/site/resources"),
//!     annotations,
//! });
//!
//! let units = JsonUnitSource::new("target/units.json").units()?;
//! let report = generator.generate(&units);
//! println!("{} documents written", report.documents.len());
//! # Ok(())
//! # }
//! ```

mod generator;
mod menu;
mod unit;

pub use generator::{
    GenerateError, GenerateReport, GeneratedDocument, GeneratorConfig, SiteGenerator, UnitFailure,
};
pub use menu::{SiteDescriptorLink, menu_links, render_menu};
pub use unit::{
    Annotation, DocumentedUnit, JsonUnitSource, SourceError, UnitSource, namespace_path,
};

// Re-export unit metadata types from aptdoc-renderer for convenience
pub use aptdoc_renderer::{AnnotationArgument, Tag};
