//! Event Log Errors

use std::path::PathBuf;
use thiserror::Error;

/// Result type for event log operations
pub type EventLogResult<T> = Result<T, EventLogError>;

/// Event log errors
#[derive(Debug, Error)]
pub enum EventLogError {
    /// The log file could not be created or opened for append
    #[error("Failed to open event log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
