//! The single message envelope carried on the transport and at the HTTP
//! boundary: `{type, timestamp, data}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of `type` values the server emits. Inbound `type` values are
/// not restricted to this set at the deserialize layer — unrecognized types
/// must be tolerated and answered with an inline error, not rejected by the
/// decoder (see [`crate::protocol::types::ClientMessage`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundKind {
    PlayerJoined,
    PlayerRejoined,
    PlayerLeft,
    PhaseChanged,
    GameStarted,
    GameEnded,
    ActionSubmitted,
    ActionDeleted,
    ActionsCleared,
    RolesAssigned,
    RoleRevealed,
    HostChanged,
    PlayerKicked,
    Error,
    SystemMessage,
    Pong,
}

impl OutboundKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlayerJoined => "player_joined",
            Self::PlayerRejoined => "player_rejoined",
            Self::PlayerLeft => "player_left",
            Self::PhaseChanged => "phase_changed",
            Self::GameStarted => "game_started",
            Self::GameEnded => "game_ended",
            Self::ActionSubmitted => "action_submitted",
            Self::ActionDeleted => "action_deleted",
            Self::ActionsCleared => "actions_cleared",
            Self::RolesAssigned => "roles_assigned",
            Self::RoleRevealed => "role_revealed",
            Self::HostChanged => "host_changed",
            Self::PlayerKicked => "player_kicked",
            Self::Error => "error",
            Self::SystemMessage => "system_message",
            Self::Pong => "pong",
        }
    }
}

/// `{type, timestamp, data}` — the uniform message framing on the persistent
/// transport and at the HTTP boundary. `timestamp` is seconds since the Unix
/// epoch at construction time, not a sequence number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: i64,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Construct an outbound envelope of a known kind, stamped with the
    /// current time. Serialization happens exactly once, by whichever
    /// Connection calls this and then writes the result to its transport.
    pub fn outbound(kind: OutboundKind, data: impl Serialize) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    /// Construct the reserved-but-dataless outbound kinds (`actions_cleared`,
    /// `host_changed`, `player_kicked`) whose `data` is absent.
    pub fn outbound_empty(kind: OutboundKind) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            data: Value::Null,
        }
    }

    /// Parse a single inbound frame. Parse failures are the caller's
    /// responsibility to log-and-continue per §4.1(b); this just surfaces
    /// the `serde_json::Error` so the read loop can decide.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize to the text frame written to the transport.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
