//! `aptdoc generate` command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use aptdoc_config::{CliSettings, Config};
use aptdoc_site::{
    GenerateReport, GeneratorConfig, JsonUnitSource, SiteGenerator, UnitSource, menu_links,
    render_menu,
};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// JSON manifest of documented units.
    units: PathBuf,

    /// Path to configuration file (default: auto-discover aptdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base output directory for generated .apt files (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Site resources directory (overrides config).
    #[arg(short, long)]
    resources: Option<PathBuf>,

    /// Annotation kind and its template path. Repeat for several kinds.
    #[arg(
        short,
        long = "annotation",
        num_args = 2,
        value_names = ["KIND", "TEMPLATE"]
    )]
    annotations: Vec<String>,

    /// Write a site.xml menu fragment linking the generated documents.
    #[arg(long)]
    menu: Option<PathBuf>,

    /// Enable verbose output (log every generated document).
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is incomplete, the unit manifest
    /// cannot be read or the menu cannot be written. Failures of single
    /// documents are reported as warnings.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            output_dir: self.output,
            resources_dir: self.resources,
            annotations: annotation_pairs(&self.annotations),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let generator_config = GeneratorConfig {
            output_dir: config.require_output_dir()?.to_path_buf(),
            resources_dir: config.resources_resolved.dir.clone(),
            annotations: config.require_annotations()?.clone(),
        };

        let units = JsonUnitSource::new(&self.units).units()?;
        tracing::debug!(count = units.len(), path = %self.units.display(), "Loaded units");

        output.info(&format!("Units: {} ({})", self.units.display(), units.len()));
        output.info(&format!("Output: {}", generator_config.output_dir.display()));
        output.info(&format!(
            "Resources: {}",
            generator_config.resources_dir.display()
        ));

        let generator = SiteGenerator::new(generator_config);
        let report = generator.generate(&units);

        for failure in &report.failures {
            output.warning(&format!(
                "Skipped {} ({}): {}",
                failure.unit, failure.kind, failure.error
            ));
        }

        if let Some(menu) = &self.menu {
            write_menu(menu, &report)?;
            output.info(&format!("Menu: {}", menu.display()));
        }

        output.success(&format!(
            "Generated {} documents ({} with fallback layout, {} skipped)",
            report.documents.len(),
            report.fallback_count(),
            report.failures.len()
        ));
        Ok(())
    }
}

/// Pair up `--annotation KIND TEMPLATE` values.
fn annotation_pairs(values: &[String]) -> Vec<(String, PathBuf)> {
    values
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), PathBuf::from(&pair[1])))
        .collect()
}

fn write_menu(path: &Path, report: &GenerateReport) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_menu(&menu_links(report)))?;
    Ok(())
}
