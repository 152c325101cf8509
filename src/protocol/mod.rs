//! Wire protocol: the envelope codec and the closed set of message types
//! carried on the persistent transport and at the HTTP boundary.

pub mod envelope;
pub mod error_codes;
pub mod room_codes;
pub mod types;
pub mod validation;

pub use envelope::Envelope;
pub use error_codes::ErrorCode;
pub use types::{ClientMessage, HostCommandPayload, PlayerId, PlayerJoinedPayload, RoomId};
