//! Configuration management for aptdoc.
//!
//! Parses `aptdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `output.dir`
//! - `resources.dir`
//! - every template path in `[annotations]`

mod expand;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override base output directory for generated `.apt` files.
    pub output_dir: Option<PathBuf>,
    /// Override site resources directory.
    pub resources_dir: Option<PathBuf>,
    /// Additional annotation kind to template mappings.
    ///
    /// Entries replace a configured template for the same kind.
    pub annotations: Vec<(String, PathBuf)>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "aptdoc.toml";

/// Maven default location of site resources.
const DEFAULT_RESOURCES_DIR: &str = "src/site/resources";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Site resources configuration.
    resources: ResourcesConfigRaw,
    /// Annotation kind to template path (relative strings from TOML).
    annotations: BTreeMap<String, String>,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Resolved resources configuration (set after loading).
    #[serde(skip)]
    pub resources_resolved: ResourcesConfig,
    /// Resolved annotation kind to template path mapping (set after loading).
    #[serde(skip)]
    pub annotations_resolved: BTreeMap<String, PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
}

/// Raw resources configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ResourcesConfigRaw {
    dir: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Base directory for generated documents. Required for generation.
    pub dir: Option<PathBuf>,
}

/// Resolved site resources configuration.
#[derive(Debug, Default)]
pub struct ResourcesConfig {
    /// Directory holding screencasts, images and generated snippets.
    pub dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// A required setting was not provided.
    #[error("Missing parameter: {0}")]
    Missing(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.dir`").
        field: String,
        /// Error message (e.g., "${`APT_OUT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `aptdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir = Some(output_dir.clone());
        }
        if let Some(resources_dir) = &settings.resources_dir {
            self.resources_resolved.dir.clone_from(resources_dir);
        }
        for (kind, template) in &settings.annotations {
            self.annotations_resolved
                .insert(kind.clone(), template.clone());
        }
    }

    /// Get the base output directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if neither the config file nor the CLI
    /// provided an output directory.
    pub fn require_output_dir(&self) -> Result<&Path, ConfigError> {
        self.output_resolved.dir.as_deref().ok_or_else(|| {
            ConfigError::Missing(
                "output directory is required but not provided ([output] dir or --output)"
                    .to_owned(),
            )
        })
    }

    /// Get the configured annotation kinds.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no annotation kind is configured.
    pub fn require_annotations(&self) -> Result<&BTreeMap<String, PathBuf>, ConfigError> {
        if self.annotations_resolved.is_empty() {
            return Err(ConfigError::Missing(
                "at least one annotation kind is required but none is configured \
                 ([annotations] or --annotation)"
                    .to_owned(),
            ));
        }
        Ok(&self.annotations_resolved)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            output: OutputConfigRaw::default(),
            resources: ResourcesConfigRaw::default(),
            annotations: BTreeMap::new(),
            output_resolved: OutputConfig::default(),
            resources_resolved: ResourcesConfig {
                dir: base.join(DEFAULT_RESOURCES_DIR),
            },
            annotations_resolved: BTreeMap::new(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI settings
    /// are applied. Missing output directory or annotation kinds are not
    /// validation failures here; see [`Config::require_output_dir`] and
    /// [`Config::require_annotations`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resources_resolved.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "resources.dir cannot be empty".to_owned(),
            ));
        }
        if let Some(dir) = &self.output_resolved.dir
            && dir.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "output.dir cannot be empty".to_owned(),
            ));
        }
        for (kind, template) in &self.annotations_resolved {
            require_non_empty(kind.trim(), "annotation kind")?;
            if template.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "template path for annotation {kind} cannot be empty"
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.output.dir {
            self.output.dir = Some(expand::expand_env(dir, "output.dir")?);
        }
        if let Some(ref dir) = self.resources.dir {
            self.resources.dir = Some(expand::expand_env(dir, "resources.dir")?);
        }
        for (kind, template) in &mut self.annotations {
            *template = expand::expand_env(template, &format!("annotations.{kind}"))?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.output_resolved = OutputConfig {
            dir: self.output.dir.as_deref().map(|dir| config_dir.join(dir)),
        };
        self.resources_resolved = ResourcesConfig {
            dir: config_dir.join(
                self.resources
                    .dir
                    .as_deref()
                    .unwrap_or(DEFAULT_RESOURCES_DIR),
            ),
        };

        let mut annotations = BTreeMap::new();
        for (kind, template) in &self.annotations {
            require_non_empty(template, &format!("annotations.{kind}"))?;
            annotations.insert(kind.clone(), config_dir.join(template));
        }
        self.annotations_resolved = annotations;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TESTCASE: &str = "ch.puzzle.annotations.TestCase";
    const USECASE: &str = "ch.puzzle.annotations.UseCase";

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.output_resolved.dir.is_none());
        assert_eq!(
            config.resources_resolved.dir,
            PathBuf::from("/test/src/site/resources")
        );
        assert!(config.annotations_resolved.is_empty());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.output.dir.is_none());
        assert!(config.annotations.is_empty());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[output]
dir = "target/apt"

[resources]
dir = "site/resources"

[annotations]
"ch.puzzle.annotations.TestCase" = "templates/testcase.apt.template"
"ch.puzzle.annotations.UseCase" = "templates/usecase.apt.template"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(
            config.output_resolved.dir,
            Some(PathBuf::from("/project/target/apt"))
        );
        assert_eq!(
            config.resources_resolved.dir,
            PathBuf::from("/project/site/resources")
        );
        assert_eq!(
            config.annotations_resolved.get(TESTCASE),
            Some(&PathBuf::from("/project/templates/testcase.apt.template"))
        );
        assert_eq!(
            config.annotations_resolved.get(USECASE),
            Some(&PathBuf::from("/project/templates/usecase.apt.template"))
        );
    }

    #[test]
    fn test_resolve_paths_default_resources_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();
        assert_eq!(
            config.resources_resolved.dir,
            PathBuf::from("/project/src/site/resources")
        );
    }

    #[test]
    fn test_resolve_paths_empty_template_is_error() {
        let toml = r#"
[annotations]
"ch.puzzle.annotations.Page" = ""
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.resolve_paths(Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("ch.puzzle.annotations.Page"));
    }

    #[test]
    fn test_apply_cli_settings_output_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            output_dir: Some(PathBuf::from("anywhere")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.output_resolved.dir, Some(PathBuf::from("anywhere")));
        assert_eq!(
            config.resources_resolved.dir,
            PathBuf::from("/test/src/site/resources")
        ); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_resources_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            resources_dir: Some(PathBuf::from("anywhere/else")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.resources_resolved.dir, PathBuf::from("anywhere/else"));
    }

    #[test]
    fn test_apply_cli_settings_annotations() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config
            .annotations_resolved
            .insert("class1".to_owned(), PathBuf::from("old"));
        let overrides = CliSettings {
            annotations: vec![
                ("class1".to_owned(), PathBuf::from("template1")),
                ("class2".to_owned(), PathBuf::from("template2")),
            ],
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.annotations_resolved.len(), 2);
        assert_eq!(
            config.annotations_resolved.get("class1"),
            Some(&PathBuf::from("template1"))
        );
        assert_eq!(
            config.annotations_resolved.get("class2"),
            Some(&PathBuf::from("template2"))
        );
    }

    #[test]
    fn test_require_output_dir_missing() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_output_dir().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("output"));
    }

    #[test]
    fn test_require_output_dir_present() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.output_resolved.dir = Some(PathBuf::from("/out"));
        assert_eq!(config.require_output_dir().unwrap(), Path::new("/out"));
    }

    #[test]
    fn test_require_annotations_missing() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.require_annotations().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
        assert!(err.to_string().contains("annotation"));
    }

    #[test]
    fn test_expand_env_vars_output_dir() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("APTDOC_TEST_OUT", "/tmp/apt");
        }

        let toml = r#"
[output]
dir = "${APTDOC_TEST_OUT}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.output.dir.as_deref(), Some("/tmp/apt"));

        unsafe {
            std::env::remove_var("APTDOC_TEST_OUT");
        }
    }

    #[test]
    fn test_expand_env_vars_template_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("APTDOC_TEST_TEMPLATES");
        }

        let toml = r#"
[annotations]
"ch.puzzle.annotations.TestCase" = "${APTDOC_TEST_TEMPLATES:-templates}/testcase.apt.template"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(
            config.annotations.get(TESTCASE).map(String::as_str),
            Some("templates/testcase.apt.template")
        );
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_APTDOC_TEST");
        }

        let toml = r#"
[resources]
dir = "${MISSING_VAR_APTDOC_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_APTDOC_TEST"));
        assert!(err.to_string().contains("resources.dir"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_annotation_kind() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config
            .annotations_resolved
            .insert("  ".to_owned(), PathBuf::from("template"));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("annotation kind"));
    }

    #[test]
    fn test_validate_empty_output_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.output_resolved.dir = Some(PathBuf::new());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.dir"));
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[output]
dir = "apt"

[annotations]
"ch.puzzle.annotations.UseCase" = "usecase.apt.template"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.config_path, Some(path.clone()));
        assert_eq!(config.require_output_dir().unwrap(), tmp.path().join("apt"));
        assert_eq!(
            config.require_annotations().unwrap().get(USECASE),
            Some(&tmp.path().join("usecase.apt.template"))
        );
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/aptdoc.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
