//! Process-lifetime counters exposed for operational visibility. Trimmed to
//! the handful of numbers that matter for this server's surface: connection
//! churn, room/player counts, broadcast volume, and the two failure modes
//! (slow-consumer eviction, frame/parse errors) worth alerting on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

#[derive(Default)]
pub struct ServerMetrics {
    connections_opened: AtomicU64,
    connections_active: AtomicU64,
    rooms_created: AtomicU64,
    players_joined: AtomicU64,
    broadcasts_sent: AtomicU64,
    slow_consumer_evictions: AtomicU64,
    frame_too_large: AtomicU64,
    parse_errors: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub connections_opened: u64,
    pub connections_active: u64,
    pub rooms_created: u64,
    pub players_joined: u64,
    pub broadcasts_sent: u64,
    pub slow_consumer_evictions: u64,
    pub frame_too_large: u64,
    pub parse_errors: u64,
}

impl ServerMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Underflow-safe: a connection closing twice (a bug elsewhere) cannot
    /// drive the active count below zero.
    pub fn record_connection_closed(&self) {
        let _ = self.connections_active.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
            Some(current.saturating_sub(1))
        });
    }

    pub fn record_room_created(&self) {
        self.rooms_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_player_joined(&self) {
        self.players_joined.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self) {
        self.broadcasts_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_slow_consumer_eviction(&self) {
        self.slow_consumer_evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_too_large(&self) {
        self.frame_too_large.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            rooms_created: self.rooms_created.load(Ordering::Relaxed),
            players_joined: self.players_joined.load(Ordering::Relaxed),
            broadcasts_sent: self.broadcasts_sent.load(Ordering::Relaxed),
            slow_consumer_evictions: self.slow_consumer_evictions.load(Ordering::Relaxed),
            frame_too_large: self.frame_too_large.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }
}
