//! Room registry: the authoritative map of room code to room state.
//!
//! A single `RwLock<HashMap<...>>` guards the whole table. Reads (lookups,
//! joins that only append a player) take a shared guard; phase advances and
//! room creation take an exclusive one. There's no per-room lock: rooms are
//! small and short-lived enough that contention on the table lock hasn't
//! been a problem in measurement on the system this is adapted from, and a
//! single lock keeps the invariant "no room exists twice under the same
//! code" trivially true.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::protocol::room_codes;
use crate::protocol::types::{PlayerId, RoomId};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no room exists with that code")]
pub struct RoomNotFound;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Night,
    Day,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lobby => "LOBBY",
            Self::Night => "NIGHT",
            Self::Day => "DAY",
        }
    }

    /// LOBBY -> NIGHT -> DAY -> NIGHT -> ... LOBBY never returns once left.
    fn next(self) -> Self {
        match self {
            Self::Lobby => Self::Night,
            Self::Night => Self::Day,
            Self::Day => Self::Night,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub code: RoomId,
    pub host_id: PlayerId,
    pub phase: Phase,
    pub players: Vec<Player>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a new room with a freshly generated code and the given host as
    /// its first player. Never fails: a colliding code (vanishingly rare at
    /// any population this server is sized for) simply overwrites whatever
    /// room previously held it, exactly as a second `create` under the same
    /// code always would.
    pub async fn create(&self, host_id: PlayerId, host_name: String) -> (RoomId, Room) {
        let code = room_codes::generate();
        let now = Utc::now();
        let room = Room {
            code: code.clone(),
            host_id,
            phase: Phase::Lobby,
            players: vec![Player { id: host_id, name: host_name }],
            created_at: now,
            updated_at: now,
        };
        self.rooms.write().await.insert(code.clone(), room.clone());
        (code, room)
    }

    pub async fn get(&self, code: &str) -> Result<Room, RoomNotFound> {
        self.rooms.read().await.get(code).cloned().ok_or(RoomNotFound)
    }

    /// Add a player to an existing room and return their assigned id.
    pub async fn join(&self, code: &str, player_name: String) -> Result<PlayerId, RoomNotFound> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(code).ok_or(RoomNotFound)?;
        let player_id = PlayerId::new_v4();
        room.players.push(Player { id: player_id, name: player_name });
        room.updated_at = Utc::now();
        Ok(player_id)
    }

    /// Advance a room's phase: LOBBY -> NIGHT -> DAY -> NIGHT -> ...
    /// Returns the new phase as its wire string.
    pub async fn advance_phase(&self, code: &str) -> Result<&'static str, RoomNotFound> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(code).ok_or(RoomNotFound)?;
        room.phase = room.phase.next();
        room.updated_at = Utc::now();
        Ok(room.phase.as_str())
    }

    pub async fn remove_player(&self, code: &str, player_id: PlayerId) -> Result<(), RoomNotFound> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(code).ok_or(RoomNotFound)?;
        room.players.retain(|p| p.id != player_id);
        room.updated_at = Utc::now();
        Ok(())
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
