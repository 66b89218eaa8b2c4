//! Node Lifecycle
//!
//! Wires the store, failure detector, event log, fan-out and heartbeat
//! loop together and runs the HTTP listener until a shutdown signal.
//! `node_start` is the first event appended, `node_stop` the last.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::NodeConfig;
use crate::detector::FailureDetector;
use crate::events::{EventKind, EventLog, EventLogError};
use crate::heartbeat::Heartbeat;
use crate::http_server::{build_router, AppState};
use crate::replication::{ReplicationError, Replicator};
use crate::store::KvStore;

/// Result type for node lifecycle operations
pub type NodeResult<T> = Result<T, NodeError>;

/// Startup and serving errors
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    EventLog(#[from] EventLogError),

    #[error(transparent)]
    Replication(#[from] ReplicationError),

    #[error("Failed to build heartbeat client: {0}")]
    HeartbeatClient(#[from] reqwest::Error),

    #[error("Listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// A running key-value node.
pub struct Node {
    config: Arc<NodeConfig>,
}

impl Node {
    /// Create a node from a validated configuration.
    pub fn new(config: NodeConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Run until shutdown: open the event log, start the fan-out and the
    /// heartbeat loop, then serve HTTP.
    pub async fn run(self) -> NodeResult<()> {
        let config = self.config;
        let log = Arc::new(EventLog::open(&config.node_id, &config.log_path)?);
        let store = Arc::new(KvStore::new());
        let detector = Arc::new(FailureDetector::new(
            config.heartbeat_timeout_ms,
            Arc::clone(&log),
        ));

        // Only the leader fans out; a follower gets an empty replicator.
        let fanout_peers = if config.is_leader {
            config.peers.as_slice()
        } else {
            &[]
        };
        let replicator =
            Replicator::start(fanout_peers, Arc::clone(&detector), Arc::clone(&log))?;

        let state = Arc::new(AppState {
            config: Arc::clone(&config),
            store,
            detector: Arc::clone(&detector),
            log: Arc::clone(&log),
            replicator,
        });
        let router = build_router(state);

        let listener = TcpListener::bind(config.bind_addr()).await?;

        log.append(EventKind::NodeStart {
            host: config.host.clone(),
            port: config.port,
            is_leader: config.is_leader,
        });
        println!(
            "Node {} listening on {} ({})",
            config.node_id,
            config.bind_addr(),
            if config.is_leader { "leader" } else { "follower" }
        );

        let heartbeat = Heartbeat::new(Arc::clone(&config), detector)?.spawn();

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        heartbeat.abort();
        log.append(EventKind::NodeStop);
        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Resolving this future stops the listener; a failed signal
    // registration falls through to an immediate stop.
    if tokio::signal::ctrl_c().await.is_err() {
        eprintln!("Failed to register shutdown signal handler");
    }
}
