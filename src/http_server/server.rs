//! Router Assembly
//!
//! Combines the client, internal and status routers over the shared node
//! state. Binding and serving live in [`crate::node`], which owns the
//! listener lifecycle.

use std::sync::Arc;

use axum::Router;

use super::client_routes::client_routes;
use super::internal_routes::internal_routes;
use super::status_routes::status_routes;
use super::AppState;

/// Build the combined router with all endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(client_routes(Arc::clone(&state)))
        .merge(internal_routes(Arc::clone(&state)))
        .merge(status_routes(state))
}
