//! Configuration: compiled defaults layered with files and environment
//! variables, per the loader's documented precedence.

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod server;
pub mod types;
pub mod validation;

pub use loader::load;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use server::{RateLimitConfig, ServerRuntimeConfig};
pub use types::Config;
pub use validation::validate_required;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_the_documented_constants() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "");
        assert_eq!(config.cors_origins, "*");
        assert_eq!(config.server.pong_wait_secs, 60);
        assert_eq!(config.rate_limit.max_room_creations, 5);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.port, deserialized.port);
        assert_eq!(config.server.pong_wait_secs, deserialized.server.pong_wait_secs);
    }
}
