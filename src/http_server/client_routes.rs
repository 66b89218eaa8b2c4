//! Client Routes
//!
//! `/put`, `/get` and `/delete`. Writes are accepted only on the leader;
//! a follower rejects them with 409 and a distinct `not_leader` error.
//! An accepted write is applied locally, logged, and offered to the
//! fan-out; the response never waits for replication.
//!
//! Bodies are parsed by hand rather than through the `Json` extractor so a
//! malformed body takes the logged `*_badreq` rejection path with the
//! `bad_json` error shape.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppState, ErrorResponse};
use crate::events::EventKind;
use crate::replication::{ReplicatedWrite, WriteOp};

// ==================
// Request/Response Types
// ==================

/// Optional caller-supplied request id, carried through to events and
/// replication pushes.
#[derive(Debug, Deserialize)]
pub struct RidQuery {
    pub rid: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PutRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct PutResponse {
    pub ok: bool,
    pub rid: String,
}

#[derive(Debug, Deserialize)]
pub struct GetRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct GetResponse {
    pub ok: bool,
    pub rid: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub rid: String,
    pub existed: bool,
}

// ==================
// Routes
// ==================

/// Create the client-facing routes.
pub fn client_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/put", post(put_handler))
        .route("/get", post(get_handler))
        .route("/delete", post(delete_handler))
        .with_state(state)
}

fn rid_or_new(rid: Option<String>) -> String {
    rid.unwrap_or_else(|| Uuid::new_v4().to_string())
}

// ==================
// Handlers
// ==================

async fn put_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RidQuery>,
    body: String,
) -> Result<Json<PutResponse>, (StatusCode, Json<ErrorResponse>)> {
    let rid = rid_or_new(query.rid);
    state.log.bump_seq();

    let Ok(request) = serde_json::from_str::<PutRequest>(&body) else {
        state.log.append_with(Some(&rid), None, EventKind::PutBadreq);
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_json())));
    };

    if !state.config.is_leader {
        state
            .log
            .append_with(Some(&rid), Some(&request.key), EventKind::PutRejectNotLeader);
        return Err((StatusCode::CONFLICT, Json(ErrorResponse::not_leader())));
    }

    state.store.put(&request.key, &request.value);
    state.log.append_with(
        Some(&rid),
        Some(&request.key),
        EventKind::PutOk {
            value_len: request.value.len(),
        },
    );
    state.replicator.publish(&ReplicatedWrite {
        rid: rid.clone(),
        op: WriteOp::Put,
        key: request.key,
        value: Some(request.value),
    });

    Ok(Json(PutResponse { ok: true, rid }))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RidQuery>,
    body: String,
) -> Result<(StatusCode, Json<GetResponse>), (StatusCode, Json<ErrorResponse>)> {
    let rid = rid_or_new(query.rid);
    state.log.bump_seq();

    let Ok(request) = serde_json::from_str::<GetRequest>(&body) else {
        state.log.append_with(Some(&rid), None, EventKind::GetBadreq);
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_json())));
    };

    match state.store.get(&request.key) {
        Some(value) => {
            state.log.append_with(
                Some(&rid),
                Some(&request.key),
                EventKind::GetOk {
                    value_len: value.len(),
                },
            );
            Ok((
                StatusCode::OK,
                Json(GetResponse {
                    ok: true,
                    rid,
                    found: true,
                    value: Some(value),
                }),
            ))
        }
        None => {
            state
                .log
                .append_with(Some(&rid), Some(&request.key), EventKind::GetNotfound);
            Ok((
                StatusCode::NOT_FOUND,
                Json(GetResponse {
                    ok: false,
                    rid,
                    found: false,
                    value: None,
                }),
            ))
        }
    }
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RidQuery>,
    body: String,
) -> Result<Json<DeleteResponse>, (StatusCode, Json<ErrorResponse>)> {
    let rid = rid_or_new(query.rid);
    state.log.bump_seq();

    let Ok(request) = serde_json::from_str::<DeleteRequest>(&body) else {
        state.log.append_with(Some(&rid), None, EventKind::DelBadreq);
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_json())));
    };

    if !state.config.is_leader {
        state
            .log
            .append_with(Some(&rid), Some(&request.key), EventKind::DelRejectNotLeader);
        return Err((StatusCode::CONFLICT, Json(ErrorResponse::not_leader())));
    }

    let existed = state.store.delete(&request.key);
    state
        .log
        .append_with(Some(&rid), Some(&request.key), EventKind::DelOk { existed });
    state.replicator.publish(&ReplicatedWrite {
        rid: rid.clone(),
        op: WriteOp::Del,
        key: request.key,
        value: None,
    });

    Ok(Json(DeleteResponse {
        ok: true,
        rid,
        existed,
    }))
}
