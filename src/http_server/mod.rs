//! HTTP Server
//!
//! The inbound boundary: client routes (`/put`, `/get`, `/delete`),
//! internal peer routes (`/internal/ping`, `/internal/replicate`) and the
//! read-only `/status` surface. Handlers drive the store, trigger the
//! fan-out and log every outcome; they hold no state of their own.

pub mod client_routes;
pub mod internal_routes;
pub mod server;
pub mod status_routes;

pub use server::build_router;

use std::sync::Arc;

use serde::Serialize;

use crate::config::NodeConfig;
use crate::detector::FailureDetector;
use crate::events::EventLog;
use crate::replication::Replicator;
use crate::store::KvStore;

/// Shared state handed to every handler.
pub struct AppState {
    pub config: Arc<NodeConfig>,
    pub store: Arc<KvStore>,
    pub detector: Arc<FailureDetector>,
    pub log: Arc<EventLog>,
    pub replicator: Replicator,
}

/// Error body for rejected requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn bad_json() -> Self {
        Self {
            error: "bad_json".to_string(),
        }
    }

    pub fn not_leader() -> Self {
        Self {
            error: "not_leader".to_string(),
        }
    }
}
