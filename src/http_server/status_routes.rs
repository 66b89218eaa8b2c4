//! Status Route
//!
//! Read-only view of the node's identity, role and per-peer health. On a
//! follower the response also carries the detector's leader-dead
//! classification; it is observability only and triggers no failover.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;
use crate::detector::HealthState;
use crate::events::now_ms;

#[derive(Debug, Serialize)]
pub struct PeerStatus {
    pub peer_id: String,
    pub state: HealthState,
    pub last_success_ms: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub node_id: String,
    pub is_leader: bool,
    pub peers: Vec<PeerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_dead: Option<bool>,
}

/// Create the status route.
pub fn status_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .with_state(state)
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let peers = state
        .detector
        .snapshot()
        .into_iter()
        .map(|(peer_id, health)| PeerStatus {
            peer_id,
            state: health.state,
            last_success_ms: health.last_success_ms,
        })
        .collect();

    let leader_dead = if state.config.is_leader {
        None
    } else {
        Some(state.detector.is_leader_dead(now_ms()))
    };

    Json(StatusResponse {
        node_id: state.config.node_id.clone(),
        is_leader: state.config.is_leader,
        peers,
        leader_dead,
    })
}
