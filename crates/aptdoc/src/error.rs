//! CLI error types.

use aptdoc_config::ConfigError;
use aptdoc_site::SourceError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
