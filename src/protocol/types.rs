//! Shared identifiers and payload shapes carried inside envelope `data` fields.
//!
//! JSON keys on the wire are camelCase (`playerId`, `isHost`, ...) per the
//! envelope schema in the specification; Rust field names stay snake_case.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, globally-unique player identity. Typically a UUID on the wire.
pub type PlayerId = Uuid;

/// A room's 6-character code, drawn from `A-Z0-9`. Doubles as the room's
/// identity: the registry has no separate internal room id.
pub type RoomId = String;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoinedPayload {
    pub player_id: PlayerId,
    pub player_name: String,
    pub is_host: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeftPayload {
    pub player_id: PlayerId,
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChangedPayload {
    pub previous_phase: String,
    pub current_phase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SystemMessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemMessagePayload {
    pub message: String,
    pub level: SystemMessageLevel,
}

/// Body of an inbound `host_command` envelope's `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostCommandPayload {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Classification of an inbound envelope's `type` field. The closed set from
/// the specification plus a catch-all for anything else, which the read loop
/// answers with `error{code:"unknown_message_type"}` rather than closing the
/// connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    JoinRoom,
    SubmitAction,
    HostCommand,
    Ping,
    Unknown(String),
}

impl ClientMessage {
    pub fn from_type(raw: &str) -> Self {
        match raw {
            "join_room" => Self::JoinRoom,
            "submit_action" => Self::SubmitAction,
            "host_command" => Self::HostCommand,
            "ping" => Self::Ping,
            other => Self::Unknown(other.to_string()),
        }
    }
}
