//! HTTP handlers for room creation, joining, the WebSocket upgrade, and the
//! database health probe.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::connect_info::ConnectInfo;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::connection::{self, ConnectionContext};
use crate::protocol::{validation, ErrorCode};
use crate::rate_limit::RateLimitError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub host_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_code: String,
    pub host_id: uuid::Uuid,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

fn error_response(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody { code: code.wire_code().to_string(), message: message.into() }),
    )
        .into_response()
}

/// `POST /api/rooms` — create a room and make its caller the host. The host's
/// identity is minted here, never trusted from the request body.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(req): Json<CreateRoomRequest>,
) -> Response {
    if let Err(err) = validation::validate_name(&req.host_name) {
        return error_response(StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest, err.message());
    }

    if let Err(RateLimitError::RoomCreationLimitExceeded { retry_after }) =
        state.rate_limiter.check_room_creation(peer.ip()).await
    {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::RateLimited,
            format!("retry after {}s", retry_after.as_secs()),
        );
    }

    let host_id = Uuid::new_v4();
    let (room_code, room) = state.registry.create(host_id, req.host_name).await;
    state.metrics.record_room_created();
    info!(room_code = %room_code, "room created");

    (StatusCode::CREATED, Json(CreateRoomResponse { room_code, host_id: room.host_id })).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub player_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomResponse {
    pub player_id: uuid::Uuid,
    pub phase: String,
}

/// `POST /api/rooms/{code}/join` — add a player to an existing room.
pub async fn join_room(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    axum::extract::Path(code): axum::extract::Path<String>,
    Json(req): Json<JoinRoomRequest>,
) -> Response {
    if let Err(err) = validation::validate_room_code(&code) {
        return error_response(StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest, err.message());
    }
    if let Err(err) = validation::validate_name(&req.player_name) {
        return error_response(StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest, err.message());
    }
    if let Err(RateLimitError::JoinLimitExceeded { retry_after }) =
        state.rate_limiter.check_join_attempt(peer.ip()).await
    {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::RateLimited,
            format!("retry after {}s", retry_after.as_secs()),
        );
    }

    match state.registry.join(&code, req.player_name).await {
        Ok(player_id) => {
            state.metrics.record_player_joined();
            let phase = match state.registry.get(&code).await {
                Ok(room) => room.phase.as_str(),
                Err(_) => "LOBBY",
            };
            Json(JoinRoomResponse { player_id, phase: phase.to_string() }).into_response()
        }
        Err(_) => error_response(StatusCode::NOT_FOUND, ErrorCode::RoomNotFound, "no room exists with that code"),
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub room: String,
    pub player: uuid::Uuid,
    pub name: String,
}

/// `GET /ws?room=&player=&name=` — upgrade to a WebSocket connection for the
/// given `(room, player, name)` identity. The core does not authenticate this
/// triple against the registry's player list any more than it authenticates
/// an `isHost` claim (§9) — it only requires the room itself to exist.
pub async fn websocket_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
) -> Response {
    let room = match state.registry.get(&query.room).await {
        Ok(room) => room,
        Err(_) => {
            return error_response(StatusCode::NOT_FOUND, ErrorCode::RoomNotFound, "no room exists with that code");
        }
    };

    let is_host = room.host_id == query.player;
    let ctx = ConnectionContext {
        hub: state.hub.clone(),
        registry: state.registry.clone(),
        metrics: state.metrics.clone(),
        runtime: state.runtime.clone(),
        room: query.room,
        player_id: query.player,
        player_name: query.name,
        is_host,
    };
    state.metrics.record_connection_opened();

    ws.on_upgrade(move |socket| async move {
        connection::run(socket, ctx).await;
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `GET /api/health/db` — liveness probe for the database dependency.
pub async fn health_db(State(state): State<Arc<AppState>>) -> Response {
    match state.database.health_check().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "healthy", error: None })).into_response(),
        Err(err) => {
            warn!(error = %err, "database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse { status: "unhealthy", error: Some(err.to_string()) }),
            )
                .into_response()
        }
    }
}
