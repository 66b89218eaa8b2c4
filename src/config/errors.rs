//! Configuration Errors
//!
//! Error types for config file loading and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON or has the wrong shape
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A peer spec did not match `id@host:port`
    #[error("Invalid peer spec '{0}': expected id@host:port")]
    InvalidPeerSpec(String),

    /// An address did not match `host:port`
    #[error("Invalid address '{0}': expected host:port")]
    InvalidAddress(String),

    /// The assembled configuration is not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a validation error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
