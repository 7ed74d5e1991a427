//! CLI error types.

use expandenv_config::ConfigError;
use expandenv_core::ExpandErrors;
use expandenv_core::document::DocumentError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Expand(#[from] ExpandErrors),
}
