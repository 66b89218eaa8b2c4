//! Replication Errors

use thiserror::Error;

/// Result type for replication operations
pub type ReplicationResult<T> = Result<T, ReplicationError>;

/// Replication setup errors.
///
/// Delivery failures are never errors: they are swallowed at the fan-out
/// boundary and converted into failure detector signal.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// The outbound HTTP client could not be constructed
    #[error("Failed to build replication client: {0}")]
    Client(#[from] reqwest::Error),
}
