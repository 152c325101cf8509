//! Router assembly: CORS, tracing, and the four admission-surface routes.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;
use crate::websocket::handler;

/// Build the router. `cors_origins` is either `"*"` or a comma-separated
/// list of origins; a malformed entry falls back to permissive with a
/// logged warning rather than refusing to start.
pub fn create_router(state: Arc<AppState>, cors_origins: &str) -> Router {
    let cors = if cors_origins.trim() == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            cors_origins.split(',').map(|origin| origin.trim().parse()).collect();
        match origins {
            Ok(origins) => CorsLayer::new().allow_origin(origins).allow_methods(tower_http::cors::Any),
            Err(err) => {
                warn!(error = %err, "invalid CORS_ORIGINS, falling back to permissive");
                CorsLayer::permissive()
            }
        }
    };

    Router::new()
        .route("/api/rooms", post(handler::create_room))
        .route("/api/rooms/{code}/join", post(handler::join_room))
        .route("/ws", get(handler::websocket_upgrade))
        .route("/api/health/db", get(handler::health_db))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
