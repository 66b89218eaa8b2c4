//! Internal Peer Routes
//!
//! `/internal/ping` answers liveness probes; `/internal/replicate` applies
//! a replicated operation to the local store. An apply is acknowledged
//! unconditionally once the body is well-formed; the follower makes no
//! attempt to detect duplicate or out-of-order deliveries, it applies
//! whatever arrives in arrival order.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{AppState, ErrorResponse};
use crate::events::EventKind;
use crate::replication::{ReplicatedWrite, WriteOp};

#[derive(Debug, Deserialize)]
pub struct PingQuery {
    /// Prober's node id; informational only.
    #[allow(dead_code)]
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// Create the peer-facing routes.
pub fn internal_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/internal/ping", get(ping_handler))
        .route("/internal/replicate", post(replicate_handler))
        .with_state(state)
}

async fn ping_handler(Query(_query): Query<PingQuery>) -> Json<AckResponse> {
    Json(AckResponse { ok: true })
}

async fn replicate_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<AckResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Ok(write) = serde_json::from_str::<ReplicatedWrite>(&body) else {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_json())));
    };

    match write.op {
        WriteOp::Put => state
            .store
            .put(&write.key, write.value.as_deref().unwrap_or_default()),
        WriteOp::Del => {
            state.store.delete(&write.key);
        }
    }

    state.log.append_with(
        Some(&write.rid),
        Some(&write.key),
        EventKind::ReplicateApply { op: write.op },
    );

    Ok(Json(AckResponse { ok: true }))
}
