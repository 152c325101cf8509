//! Per-client rate limiting for the two admission-surface operations that
//! can be abused without ever opening a WebSocket: room creation and join
//! attempts.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::config::RateLimitConfig as ConfiguredRateLimit;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_room_creations: u32,
    pub max_join_attempts: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_room_creations: 5,
            max_join_attempts: 20,
            window: Duration::from_secs(60),
        }
    }
}

impl From<&ConfiguredRateLimit> for RateLimitConfig {
    fn from(cfg: &ConfiguredRateLimit) -> Self {
        Self {
            max_room_creations: cfg.max_room_creations,
            max_join_attempts: cfg.max_join_attempts,
            window: cfg.window(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("room creation limit exceeded")]
    RoomCreationLimitExceeded { retry_after: Duration },
    #[error("join attempt limit exceeded")]
    JoinLimitExceeded { retry_after: Duration },
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    room_creations: u32,
    join_attempts: u32,
    window_start: Instant,
}

impl RateLimitEntry {
    fn new(now: Instant) -> Self {
        Self { room_creations: 0, join_attempts: 0, window_start: now }
    }

    fn maybe_reset_window(&mut self, now: Instant, window: Duration) {
        if now.duration_since(self.window_start) >= window {
            self.room_creations = 0;
            self.join_attempts = 0;
            self.window_start = now;
        }
    }

    fn time_until_reset(&self, now: Instant, window: Duration) -> Duration {
        window.saturating_sub(now.duration_since(self.window_start))
    }
}

/// Tracks room-creation and join-attempt counts per client over a sliding
/// window, reset wholesale rather than with a rolling bucket: good enough
/// for the abuse patterns this guards against, and much simpler to reason
/// about under concurrent access.
pub struct RoomRateLimiter {
    config: RateLimitConfig,
    entries: RwLock<HashMap<IpAddr, RateLimitEntry>>,
}

impl RoomRateLimiter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { config: RateLimitConfig::default(), entries: RwLock::new(HashMap::new()) })
    }

    pub fn with_config(config: RateLimitConfig) -> Arc<Self> {
        Arc::new(Self { config, entries: RwLock::new(HashMap::new()) })
    }

    pub async fn check_room_creation(&self, client_id: IpAddr) -> Result<(), RateLimitError> {
        self.check(client_id, Check::RoomCreation).await
    }

    pub async fn check_join_attempt(&self, client_id: IpAddr) -> Result<(), RateLimitError> {
        self.check(client_id, Check::JoinAttempt).await
    }

    async fn check(&self, client_id: IpAddr, kind: Check) -> Result<(), RateLimitError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let entry = entries.entry(client_id).or_insert_with(|| RateLimitEntry::new(now));
        entry.maybe_reset_window(now, self.config.window);

        match kind {
            Check::RoomCreation => {
                if entry.room_creations >= self.config.max_room_creations {
                    return Err(RateLimitError::RoomCreationLimitExceeded {
                        retry_after: entry.time_until_reset(now, self.config.window),
                    });
                }
                entry.room_creations += 1;
            }
            Check::JoinAttempt => {
                if entry.join_attempts >= self.config.max_join_attempts {
                    return Err(RateLimitError::JoinLimitExceeded {
                        retry_after: entry.time_until_reset(now, self.config.window),
                    });
                }
                entry.join_attempts += 1;
            }
        }
        Ok(())
    }

    /// Drop entries whose window expired more than one window ago and that
    /// have made no further attempts since, keeping the map from growing
    /// unbounded across a long-running server's lifetime.
    pub async fn cleanup_old_entries(&self) {
        let now = Instant::now();
        let stale_after = self.config.window * 2;
        self.entries
            .write()
            .await
            .retain(|_, entry| now.duration_since(entry.window_start) < stale_after);
    }

    /// Spawn a background task that periodically calls `cleanup_old_entries`.
    pub fn spawn_cleanup_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = self.config.window;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.cleanup_old_entries().await;
            }
        })
    }
}

enum Check {
    RoomCreation,
    JoinAttempt,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(last_octet: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last_octet])
    }

    #[tokio::test]
    async fn allows_up_to_the_configured_limit() {
        let limiter = RoomRateLimiter::with_config(RateLimitConfig {
            max_room_creations: 3,
            max_join_attempts: 3,
            window: Duration::from_secs(60),
        });
        let client = client(1);
        for _ in 0..3 {
            assert!(limiter.check_room_creation(client).await.is_ok());
        }
        assert!(matches!(
            limiter.check_room_creation(client).await,
            Err(RateLimitError::RoomCreationLimitExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn room_creation_and_join_limits_are_tracked_independently() {
        let limiter = RoomRateLimiter::with_config(RateLimitConfig {
            max_room_creations: 1,
            max_join_attempts: 5,
            window: Duration::from_secs(60),
        });
        let client = client(2);
        assert!(limiter.check_room_creation(client).await.is_ok());
        assert!(limiter.check_room_creation(client).await.is_err());
        assert!(limiter.check_join_attempt(client).await.is_ok());
    }

    #[tokio::test]
    async fn different_clients_have_independent_budgets() {
        let limiter = RoomRateLimiter::with_config(RateLimitConfig {
            max_room_creations: 1,
            max_join_attempts: 1,
            window: Duration::from_secs(60),
        });
        let a = client(3);
        let b = client(4);
        assert!(limiter.check_room_creation(a).await.is_ok());
        assert!(limiter.check_room_creation(b).await.is_ok());
    }

    #[tokio::test]
    async fn cleanup_drops_stale_entries() {
        let limiter = RoomRateLimiter::with_config(RateLimitConfig {
            max_room_creations: 1,
            max_join_attempts: 1,
            window: Duration::from_millis(1),
        });
        let client = client(5);
        limiter.check_room_creation(client).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        limiter.cleanup_old_entries().await;
        assert!(limiter.entries.read().await.is_empty());
    }
}
