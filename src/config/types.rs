//! Root configuration type.

use serde::{Deserialize, Serialize};

use super::defaults::{default_cors_origins, default_port};
use super::logging::LoggingConfig;
use super::server::{RateLimitConfig, ServerRuntimeConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Required at startup (fatal if empty, per the error-handling design's
    /// fatality rule); not validated for reachability here, only shape.
    #[serde(default)]
    pub database_url: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerRuntimeConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_url: String::new(),
            logging: LoggingConfig::default(),
            server: ServerRuntimeConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cors_origins: default_cors_origins(),
        }
    }
}
