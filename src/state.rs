//! The server's shared aggregate: one instance wired up in `main` and handed
//! to every axum handler via `Arc` extraction, mirroring how the connection
//! handling and room coordination pieces are composed upstream.

use std::sync::Arc;

use crate::config::ServerRuntimeConfig;
use crate::database::Database;
use crate::hub::Hub;
use crate::metrics::ServerMetrics;
use crate::rate_limit::{RateLimitConfig, RoomRateLimiter};
use crate::registry::RoomRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub hub: Hub,
    pub metrics: Arc<ServerMetrics>,
    pub rate_limiter: Arc<RoomRateLimiter>,
    pub database: Arc<dyn Database>,
    pub runtime: Arc<ServerRuntimeConfig>,
}

impl AppState {
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self::with_config(database, &ServerRuntimeConfig::default(), &crate::config::RateLimitConfig::default())
    }

    pub fn with_config(
        database: Arc<dyn Database>,
        runtime: &ServerRuntimeConfig,
        rate_limit: &crate::config::RateLimitConfig,
    ) -> Self {
        let metrics = ServerMetrics::new();
        Self {
            registry: RoomRegistry::new(),
            hub: Hub::spawn(metrics.clone()),
            metrics,
            rate_limiter: RoomRateLimiter::with_config(RateLimitConfig::from(rate_limit)),
            database,
            runtime: Arc::new(runtime.clone()),
        }
    }
}
