//! Per-client connection handling: a read loop and a write loop running as
//! two separately spawned tasks, joined only by the outbound mpsc queue and
//! the Hub's membership entry for this connection.
//!
//! The split exists so a slow or silent peer on the write side never stalls
//! reading from them, and vice versa: the only way the two loops interact is
//! that closing the outbound queue (on eviction, or when the read loop exits
//! and unregisters) is what tells the write loop to stop.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::ServerRuntimeConfig;
use crate::hub::Hub;
use crate::metrics::ServerMetrics;
use crate::protocol::types::{ClientMessage, HostCommandPayload, PlayerId, PlayerJoinedPayload, PlayerLeftPayload, RoomId};
use crate::protocol::{Envelope, ErrorCode};
use crate::protocol::envelope::OutboundKind;
use crate::registry::RoomRegistry;

/// Maximum time to wait for a pong before treating the peer as gone. Used as
/// the fallback when no runtime configuration is supplied.
pub const READ_DEADLINE: Duration = Duration::from_secs(60);
/// Interval between pings sent from the write loop.
pub const PING_PERIOD: Duration = Duration::from_secs(54);
/// Maximum time allowed for a single write to complete.
pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);
/// Maximum accepted inbound frame size, in bytes.
pub const MAX_FRAME_BYTES: usize = 512;

pub struct ConnectionContext {
    pub hub: Hub,
    pub registry: Arc<RoomRegistry>,
    pub metrics: Arc<ServerMetrics>,
    pub runtime: Arc<ServerRuntimeConfig>,
    pub room: RoomId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub is_host: bool,
}

/// Drive a single accepted WebSocket connection until either side closes it.
/// Registers with the Hub on entry and unregisters on every exit path,
/// including panics unwound through the caller (axum aborts the task, which
/// drops `ctx` and the sender it handed to the Hub, closing the queue).
pub async fn run(socket: WebSocket, ctx: ConnectionContext) {
    let read_deadline = ctx.runtime.pong_wait();
    let ping_period = ctx.runtime.ping_period();
    let write_deadline = ctx.runtime.write_wait();
    let max_frame_bytes = ctx.runtime.max_frame_bytes;
    let outbound_capacity = ctx.runtime.outbound_queue_capacity;

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<Envelope>(outbound_capacity);

    // The Hub holds the only `Sender`. A connection's own self-directed
    // sends (pong replies, inline errors) route back through the Hub rather
    // than a second clone held here, so that evicting a slow consumer (which
    // drops the Hub's clone) actually closes the queue and stops the write
    // loop, instead of leaving it open because this loop also held a handle.
    ctx.hub.register(ctx.room.clone(), ctx.player_id, out_tx).await;

    let joined = Envelope::outbound(
        OutboundKind::PlayerJoined,
        PlayerJoinedPayload { player_id: ctx.player_id, player_name: ctx.player_name.clone(), is_host: ctx.is_host },
    );
    ctx.hub.broadcast_to_room(ctx.room.clone(), joined).await;

    let write_task = tokio::spawn(async move {
        let mut ping_tick = time::interval(ping_period);
        ping_tick.tick().await; // first tick fires immediately; discard it

        loop {
            tokio::select! {
                outbound = out_rx.recv() => {
                    let Some(envelope) = outbound else {
                        break;
                    };
                    if send(&mut ws_tx, &envelope, write_deadline).await.is_err() {
                        break;
                    }
                }
                _ = ping_tick.tick() => {
                    if time::timeout(write_deadline, ws_tx.send(Message::Ping(Vec::new().into()))).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = ws_tx.close().await;
    });

    let mut read_deadline_at = time::Instant::now() + read_deadline;

    loop {
        let frame = match time::timeout_at(read_deadline_at, ws_rx.next()).await {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(_))) => {
                warn!(room = %ctx.room, player_id = %ctx.player_id, "transport error on read");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                debug!(room = %ctx.room, player_id = %ctx.player_id, "read deadline expired");
                break;
            }
        };

        match frame {
            Message::Pong(_) => {
                read_deadline_at = time::Instant::now() + read_deadline;
            }
            Message::Close(_) => break,
            Message::Text(text) => {
                if text.len() > max_frame_bytes {
                    ctx.metrics.record_frame_too_large();
                    send_error(&ctx, ErrorCode::FrameTooLarge).await;
                    continue;
                }
                handle_frame(&ctx, &text).await;
            }
            Message::Binary(bytes) => {
                if bytes.len() > max_frame_bytes {
                    ctx.metrics.record_frame_too_large();
                    send_error(&ctx, ErrorCode::FrameTooLarge).await;
                }
                // Binary frames otherwise carry no defined payload; ignore.
            }
            Message::Ping(_) => {}
        }
    }

    ctx.hub.unregister(ctx.room.clone(), ctx.player_id).await;
    let left = Envelope::outbound(
        OutboundKind::PlayerLeft,
        PlayerLeftPayload { player_id: ctx.player_id, player_name: ctx.player_name.clone() },
    );
    ctx.hub.broadcast_to_room(ctx.room.clone(), left).await;
    let _ = write_task.await;
    ctx.metrics.record_connection_closed();
    info!(room = %ctx.room, player_id = %ctx.player_id, "connection closed");
}

async fn send(ws_tx: &mut SplitSink<WebSocket, Message>, envelope: &Envelope, write_deadline: Duration) -> Result<(), ()> {
    let Ok(text) = envelope.to_text() else { return Err(()) };
    time::timeout(write_deadline, ws_tx.send(Message::Text(text.into())))
        .await
        .map_err(|_| ())?
        .map_err(|_| ())
}

async fn send_error(ctx: &ConnectionContext, code: ErrorCode) {
    let payload = crate::protocol::types::ErrorPayload {
        code: code.wire_code().to_string(),
        message: code.description().to_string(),
    };
    let envelope = Envelope::outbound(OutboundKind::Error, payload);
    ctx.hub.send_to_member(ctx.room.clone(), ctx.player_id, envelope).await;
}

async fn handle_frame(ctx: &ConnectionContext, raw: &str) {
    let envelope = match Envelope::parse(raw) {
        Ok(envelope) => envelope,
        Err(_) => {
            ctx.metrics.record_parse_error();
            send_error(ctx, ErrorCode::InvalidRequest).await;
            return;
        }
    };

    match ClientMessage::from_type(&envelope.kind) {
        ClientMessage::Ping => {
            ctx.hub
                .send_to_member(ctx.room.clone(), ctx.player_id, Envelope::outbound_empty(OutboundKind::Pong))
                .await;
        }
        ClientMessage::JoinRoom => {
            // Admission already happened over HTTP before the socket was
            // upgraded; a client sending this mid-connection is announcing a
            // reconnect, not asking to join again.
            let envelope = Envelope::outbound(
                OutboundKind::PlayerRejoined,
                PlayerJoinedPayload {
                    player_id: ctx.player_id,
                    player_name: ctx.player_name.clone(),
                    is_host: ctx.is_host,
                },
            );
            ctx.hub.broadcast_to_room(ctx.room.clone(), envelope).await;
        }
        ClientMessage::SubmitAction => {
            info!(room = %ctx.room, player_id = %ctx.player_id, data = %envelope.data, "action submitted");
        }
        ClientMessage::HostCommand => {
            if !ctx.is_host {
                send_error(ctx, ErrorCode::NotHost).await;
                return;
            }
            let Ok(command) = serde_json::from_value::<HostCommandPayload>(envelope.data) else {
                send_error(ctx, ErrorCode::InvalidRequest).await;
                return;
            };
            dispatch_host_command(ctx, command).await;
        }
        ClientMessage::Unknown(_) => {
            send_error(ctx, ErrorCode::UnknownMessageType).await;
        }
    }
}

async fn dispatch_host_command(ctx: &ConnectionContext, command: HostCommandPayload) {
    match command.command.as_str() {
        "advance_phase" => match ctx.registry.advance_phase(&ctx.room).await {
            Ok(phase) => {
                let envelope = Envelope::outbound(
                    OutboundKind::PhaseChanged,
                    serde_json::json!({ "currentPhase": phase }),
                );
                ctx.hub.broadcast_to_room(ctx.room.clone(), envelope).await;
            }
            Err(_) => send_error(ctx, ErrorCode::RoomNotFound).await,
        },
        _ => send_error(ctx, ErrorCode::InvalidRequest).await,
    }
}
