//! Runtime constants for connection timing and the admission-surface rate
//! limiter. These are the §5 concurrency constants, exposed as configuration
//! rather than literals scattered through `connection.rs`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::{
    default_max_frame_bytes, default_max_join_attempts, default_max_room_creations,
    default_outbound_queue_capacity, default_ping_period_secs, default_pong_wait_secs,
    default_rate_limit_window_secs, default_room_code_length, default_write_wait_secs,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRuntimeConfig {
    /// Max interval without a keepalive reply before the read loop fails.
    #[serde(default = "default_pong_wait_secs")]
    pub pong_wait_secs: u64,
    /// Keepalive probe interval; must stay below `pong_wait_secs`.
    #[serde(default = "default_ping_period_secs")]
    pub ping_period_secs: u64,
    /// Per-frame write deadline.
    #[serde(default = "default_write_wait_secs")]
    pub write_wait_secs: u64,
    /// Maximum accepted inbound frame size, in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Per-connection outbound queue depth before a client is a slow consumer.
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
    /// Fixed by the room code alphabet; kept as a named constant rather than
    /// a literal in `protocol::room_codes`.
    #[serde(default = "default_room_code_length")]
    pub room_code_length: usize,
}

impl ServerRuntimeConfig {
    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_secs)
    }

    pub fn ping_period(&self) -> Duration {
        Duration::from_secs(self.ping_period_secs)
    }

    pub fn write_wait(&self) -> Duration {
        Duration::from_secs(self.write_wait_secs)
    }
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            pong_wait_secs: default_pong_wait_secs(),
            ping_period_secs: default_ping_period_secs(),
            write_wait_secs: default_write_wait_secs(),
            max_frame_bytes: default_max_frame_bytes(),
            outbound_queue_capacity: default_outbound_queue_capacity(),
            room_code_length: default_room_code_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Max room-creation requests per caller per window.
    #[serde(default = "default_max_room_creations")]
    pub max_room_creations: u32,
    /// Max join attempts per caller per window.
    #[serde(default = "default_max_join_attempts")]
    pub max_join_attempts: u32,
    /// Sliding-window length, in seconds.
    #[serde(default = "default_rate_limit_window_secs")]
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_room_creations: default_max_room_creations(),
            max_join_attempts: default_max_join_attempts(),
            window_secs: default_rate_limit_window_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_period_is_below_pong_wait_by_default() {
        let cfg = ServerRuntimeConfig::default();
        assert!(cfg.ping_period() < cfg.pong_wait());
    }

    #[test]
    fn defaults_match_the_specified_constants() {
        let cfg = ServerRuntimeConfig::default();
        assert_eq!(cfg.pong_wait_secs, 60);
        assert_eq!(cfg.ping_period_secs, 54);
        assert_eq!(cfg.write_wait_secs, 10);
        assert_eq!(cfg.max_frame_bytes, 512);
        assert_eq!(cfg.outbound_queue_capacity, 256);
    }
}
