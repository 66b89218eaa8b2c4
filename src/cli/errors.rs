//! CLI Errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::node::NodeError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Top-level CLI errors, printed to stderr by `main`
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}
