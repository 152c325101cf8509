//! The Hub: a single long-lived task owning the room membership table and
//! the fan-out of envelopes to each room's connections.
//!
//! Connections never touch the membership map directly. They talk to the
//! Hub through three mpsc channels (register, unregister, broadcast) plus a
//! direct `broadcast_to_room` method that races those channels with no
//! intermediate hop, mirroring how this server's predecessor kept its relay
//! core single-writer while letting callers fire-and-forget.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::metrics::ServerMetrics;
use crate::protocol::types::{PlayerId, RoomId};
use crate::protocol::Envelope;

/// Outbound queue depth for a single connection. A connection that can't
/// keep its queue under this depth is a slow consumer and gets evicted
/// rather than letting the Hub's single task block on it.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

pub type OutboundSender = mpsc::Sender<Envelope>;

struct Member {
    player_id: PlayerId,
    sender: OutboundSender,
}

enum Command {
    Register { room: RoomId, player_id: PlayerId, sender: OutboundSender },
    Unregister { room: RoomId, player_id: PlayerId },
    Broadcast { room: RoomId, envelope: Envelope },
    SendToMember { room: RoomId, player_id: PlayerId, envelope: Envelope },
}

/// Handle held by every Connection and by the admission surface. Cloning is
/// cheap: it's just a channel sender.
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::Sender<Command>,
}

impl Hub {
    /// Spawn the Hub's coordinating task and return a handle to it. The
    /// task runs until every handle (and thus the command channel) is
    /// dropped.
    pub fn spawn(metrics: Arc<ServerMetrics>) -> Self {
        let (tx, rx) = mpsc::channel(1024);
        tokio::spawn(run(rx, metrics));
        Self { commands: tx }
    }

    pub async fn register(&self, room: RoomId, player_id: PlayerId, sender: OutboundSender) {
        let _ = self.commands.send(Command::Register { room, player_id, sender }).await;
    }

    pub async fn unregister(&self, room: RoomId, player_id: PlayerId) {
        let _ = self.commands.send(Command::Unregister { room, player_id }).await;
    }

    /// Enqueue an envelope for every connection currently registered to
    /// `room`. Delivery is non-blocking per recipient: a full queue marks
    /// that recipient a slow consumer and the Hub evicts it, it does not
    /// slow delivery to the rest of the room.
    pub async fn broadcast_to_room(&self, room: RoomId, envelope: Envelope) {
        let _ = self.commands.send(Command::Broadcast { room, envelope }).await;
    }

    /// Enqueue an envelope for a single member only (used by a Connection's
    /// own read loop to deliver a `pong` or inline `error` to itself). Goes
    /// through the same non-blocking, evict-on-full path as a room broadcast
    /// so a connection that floods itself with self-directed traffic is
    /// subject to the same slow-consumer policy as any other recipient. A
    /// member that is no longer registered (already evicted, or never
    /// registered) makes this a no-op, matching `broadcast_to_room`'s
    /// no-op-on-absent-room behavior.
    pub async fn send_to_member(&self, room: RoomId, player_id: PlayerId, envelope: Envelope) {
        let _ = self.commands.send(Command::SendToMember { room, player_id, envelope }).await;
    }
}

async fn run(mut commands: mpsc::Receiver<Command>, metrics: Arc<ServerMetrics>) {
    let mut rooms: HashMap<RoomId, Vec<Member>> = HashMap::new();

    while let Some(command) = commands.recv().await {
        match command {
            Command::Register { room, player_id, sender } => {
                rooms.entry(room).or_default().push(Member { player_id, sender });
            }
            Command::Unregister { room, player_id } => {
                unregister(&mut rooms, &room, player_id);
            }
            Command::Broadcast { room, envelope } => {
                broadcast(&mut rooms, &room, envelope, &metrics);
            }
            Command::SendToMember { room, player_id, envelope } => {
                send_to_member(&mut rooms, &room, player_id, envelope, &metrics);
            }
        }
    }
}

fn unregister(rooms: &mut HashMap<RoomId, Vec<Member>>, room: &str, player_id: PlayerId) {
    let Some(members) = rooms.get_mut(room) else { return };
    members.retain(|member| member.player_id != player_id);
    if members.is_empty() {
        rooms.remove(room);
    }
}

fn broadcast(rooms: &mut HashMap<RoomId, Vec<Member>>, room: &str, envelope: Envelope, metrics: &ServerMetrics) {
    let Some(members) = rooms.get_mut(room) else {
        debug!(room, "broadcast to room with no registered connections");
        return;
    };

    let mut evicted = Vec::new();
    for member in members.iter() {
        match member.sender.try_send(envelope.clone()) {
            Ok(()) => {
                metrics.record_broadcast();
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(room, player_id = %member.player_id, "slow consumer, evicting");
                metrics.record_slow_consumer_eviction();
                evicted.push(member.player_id);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                evicted.push(member.player_id);
            }
        }
    }

    if !evicted.is_empty() {
        members.retain(|member| !evicted.contains(&member.player_id));
    }
    if members.is_empty() {
        rooms.remove(room);
    }
}

fn send_to_member(
    rooms: &mut HashMap<RoomId, Vec<Member>>,
    room: &str,
    player_id: PlayerId,
    envelope: Envelope,
    metrics: &ServerMetrics,
) {
    let Some(members) = rooms.get_mut(room) else { return };
    let Some(member) = members.iter().find(|m| m.player_id == player_id) else { return };

    match member.sender.try_send(envelope) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(room, %player_id, "slow consumer (self-directed send), evicting");
            metrics.record_slow_consumer_eviction();
            members.retain(|m| m.player_id != player_id);
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            members.retain(|m| m.player_id != player_id);
        }
    }

    if members.is_empty() {
        rooms.remove(room);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> Envelope {
        Envelope::parse(r#"{"type":"ping","timestamp":0,"data":null}"#).unwrap()
    }

    #[tokio::test]
    async fn broadcast_reaches_every_member_of_the_room() {
        let hub = Hub::spawn(ServerMetrics::new());
        let (tx_a, mut rx_a) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let (tx_b, mut rx_b) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        hub.register("ROOM01".to_string(), PlayerId::new_v4(), tx_a).await;
        hub.register("ROOM01".to_string(), PlayerId::new_v4(), tx_b).await;

        hub.broadcast_to_room("ROOM01".to_string(), envelope()).await;

        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn broadcast_does_not_cross_rooms() {
        let hub = Hub::spawn(ServerMetrics::new());
        let (tx_a, mut rx_a) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let (tx_b, mut rx_b) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        hub.register("ROOM01".to_string(), PlayerId::new_v4(), tx_a).await;
        hub.register("ROOM02".to_string(), PlayerId::new_v4(), tx_b).await;

        hub.broadcast_to_room("ROOM01".to_string(), envelope()).await;
        // Give the hub task a moment to process before asserting absence.
        tokio::task::yield_now().await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_removes_the_member_from_future_broadcasts() {
        let hub = Hub::spawn(ServerMetrics::new());
        let player_id = PlayerId::new_v4();
        let (tx, mut rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        hub.register("ROOM01".to_string(), player_id, tx).await;
        hub.unregister("ROOM01".to_string(), player_id).await;

        hub.broadcast_to_room("ROOM01".to_string(), envelope()).await;
        tokio::task::yield_now().await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn double_unregister_is_a_no_op() {
        let hub = Hub::spawn(ServerMetrics::new());
        let player_id = PlayerId::new_v4();
        let (tx, _rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        hub.register("ROOM01".to_string(), player_id, tx).await;
        hub.unregister("ROOM01".to_string(), player_id).await;
        hub.unregister("ROOM01".to_string(), player_id).await;
    }

    #[tokio::test]
    async fn slow_consumer_is_evicted_without_blocking_other_members() {
        let hub = Hub::spawn(ServerMetrics::new());
        let (tx_slow, rx_slow) = mpsc::channel(1);
        let (tx_fast, mut rx_fast) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        hub.register("ROOM01".to_string(), PlayerId::new_v4(), tx_slow).await;
        hub.register("ROOM01".to_string(), PlayerId::new_v4(), tx_fast).await;

        // Fill the slow consumer's queue without draining it.
        for _ in 0..5 {
            hub.broadcast_to_room("ROOM01".to_string(), envelope()).await;
        }

        // The fast consumer keeps receiving despite the slow one filling up.
        let mut received = 0;
        while rx_fast.try_recv().is_ok() {
            received += 1;
        }
        assert!(received >= 1);
        drop(rx_slow);
    }

    #[tokio::test]
    async fn eviction_closes_the_slow_consumers_queue() {
        let hub = Hub::spawn(ServerMetrics::new());
        let (tx_slow, mut rx_slow) = mpsc::channel(1);
        hub.register("ROOM01".to_string(), PlayerId::new_v4(), tx_slow).await;

        hub.broadcast_to_room("ROOM01".to_string(), envelope()).await; // fills the queue
        hub.broadcast_to_room("ROOM01".to_string(), envelope()).await; // overflow, evicts

        // The Hub held the only Sender; eviction drops it, so recv() drains
        // the one buffered envelope and then observes the channel is closed.
        assert!(rx_slow.recv().await.is_some());
        assert!(rx_slow.recv().await.is_none());
    }

    #[tokio::test]
    async fn send_to_member_reaches_only_the_named_member() {
        let hub = Hub::spawn(ServerMetrics::new());
        let (tx_a, mut rx_a) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let (tx_b, mut rx_b) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let player_a = PlayerId::new_v4();
        hub.register("ROOM01".to_string(), player_a, tx_a).await;
        hub.register("ROOM01".to_string(), PlayerId::new_v4(), tx_b).await;

        hub.send_to_member("ROOM01".to_string(), player_a, envelope()).await;
        tokio::task::yield_now().await;

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_to_member_on_unregistered_player_is_a_no_op() {
        let hub = Hub::spawn(ServerMetrics::new());
        hub.send_to_member("ROOM01".to_string(), PlayerId::new_v4(), envelope()).await;
        tokio::task::yield_now().await;
    }
}
