//! CLI error types.

use mdpress_config::ConfigError;
use mdpress_renderer::RenderError;
use mdpress_storage_drive::DriveError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Drive(#[from] DriveError),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(String),
}
