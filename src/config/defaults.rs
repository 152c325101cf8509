//! Default value functions used by serde's `#[serde(default = ...)]` across
//! the configuration types. Kept as free functions, one per field, the same
//! way the server this is adapted from organizes its defaults module.

use super::logging::LogFormat;

pub const fn default_port() -> u16 {
    8080
}

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub const fn default_pong_wait_secs() -> u64 {
    60
}

pub const fn default_ping_period_secs() -> u64 {
    54
}

pub const fn default_write_wait_secs() -> u64 {
    10
}

pub const fn default_max_frame_bytes() -> usize {
    512
}

pub const fn default_outbound_queue_capacity() -> usize {
    256
}

pub const fn default_room_code_length() -> usize {
    6
}

pub const fn default_max_room_creations() -> u32 {
    5
}

pub const fn default_max_join_attempts() -> u32 {
    20
}

pub const fn default_rate_limit_window_secs() -> u64 {
    60
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
