//! The closed set of error codes the server reports, both inline (the
//! `error` envelope on the transport) and as HTTP problem bodies at the
//! admission surface.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The room code in a join attempt or room-scoped operation doesn't
    /// exist in the registry.
    RoomNotFound,
    /// A request or envelope failed structural or semantic validation.
    InvalidRequest,
    /// A `host_command` arrived from a connection that isn't the room's
    /// current host.
    NotHost,
    /// An inbound envelope's `type` isn't one of the known message kinds.
    UnknownMessageType,
    /// An inbound frame exceeded the maximum frame size.
    FrameTooLarge,
    /// The underlying transport returned an error outside the closed
    /// deadline/frame-size cases.
    TransportError,
    /// No pong was received within the read deadline.
    ReadDeadlineExpired,
    /// A connection's outbound queue was full; the connection was evicted.
    SlowConsumer,
    /// A transport error judged recoverable by the caller, surfaced for
    /// logging rather than connection teardown.
    TransientTransportError,
    /// The caller exceeded the room-creation or join-attempt budget for its
    /// rate-limit window.
    RateLimited,
}

impl ErrorCode {
    /// The wire representation used in an `error` envelope's `code` field and
    /// in HTTP problem bodies, e.g. `not_host`, `unknown_message_type`.
    /// Matches the `Serialize` impl exactly; kept as a cheap direct method so
    /// callers that just need the string don't round-trip through JSON.
    pub fn wire_code(self) -> &'static str {
        match self {
            Self::RoomNotFound => "room_not_found",
            Self::InvalidRequest => "invalid_request",
            Self::NotHost => "not_host",
            Self::UnknownMessageType => "unknown_message_type",
            Self::FrameTooLarge => "frame_too_large",
            Self::TransportError => "transport_error",
            Self::ReadDeadlineExpired => "read_deadline_expired",
            Self::SlowConsumer => "slow_consumer",
            Self::TransientTransportError => "transient_transport_error",
            Self::RateLimited => "rate_limited",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::RoomNotFound => "no room exists with that code",
            Self::InvalidRequest => "the request was malformed or failed validation",
            Self::NotHost => "only the room's host may issue this command",
            Self::UnknownMessageType => "the message type is not recognized",
            Self::FrameTooLarge => "the frame exceeded the maximum allowed size",
            Self::TransportError => "the transport returned an unrecoverable error",
            Self::ReadDeadlineExpired => "no pong was received within the read deadline",
            Self::SlowConsumer => "the connection's outbound queue filled up and was evicted",
            Self::TransientTransportError => "the transport returned a recoverable error",
            Self::RateLimited => "too many requests; the rate limit window has not reset yet",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
