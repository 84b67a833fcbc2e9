//! Live room membership and fan-out.
//!
//! The registry is the ephemeral view of who currently has a channel open.
//! It holds only each session's outbound event sender, never the session
//! itself, so a dead connection can always be evicted without leaking its
//! resources. All state is rebuilt from scratch as sessions rejoin after a
//! restart.

use std::collections::HashMap;

use tokio::sync::{mpsc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::protocol::ServerEvent;

/// Identity of one live connection session
pub type SessionId = Uuid;

/// Outbound frames buffered per session before delivery counts as failed
pub const SESSION_BUFFER: usize = 256;

/// In-memory mapping from channel identity to the sessions currently in its
/// room.
#[derive(Default)]
pub struct ChannelRegistry {
    rooms: Mutex<HashMap<i64, HashMap<SessionId, mpsc::Sender<ServerEvent>>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to a channel's room. Idempotent: re-joining replaces
    /// the stored sender, so a session never receives a broadcast twice.
    pub async fn join(
        &self,
        channel_id: i64,
        session_id: SessionId,
        tx: mpsc::Sender<ServerEvent>,
    ) {
        let mut rooms = self.rooms.lock().await;
        rooms.entry(channel_id).or_default().insert(session_id, tx);
        debug!(channel_id, %session_id, "session joined room");
    }

    /// Remove a session from a channel's room. Leaving a room never joined
    /// is a no-op.
    pub async fn leave(&self, channel_id: i64, session_id: SessionId) {
        let mut rooms = self.rooms.lock().await;
        if let Some(room) = rooms.get_mut(&channel_id) {
            room.remove(&session_id);
            if room.is_empty() {
                rooms.remove(&channel_id);
            }
        }
        debug!(channel_id, %session_id, "session left room");
    }

    /// Remove a session from every room it is part of
    pub async fn drop_session(&self, session_id: SessionId) {
        let mut rooms = self.rooms.lock().await;
        for room in rooms.values_mut() {
            room.remove(&session_id);
        }
        rooms.retain(|_, room| !room.is_empty());
        debug!(%session_id, "session dropped from all rooms");
    }

    /// Discard a channel's room entirely. Used when the channel is deleted.
    pub async fn evict(&self, channel_id: i64) {
        self.rooms.lock().await.remove(&channel_id);
    }

    /// Deliver an event to every session in the room at the moment of the
    /// call. Delivery per session is fire-and-forget: a failed send never
    /// aborts the rest and is reported only through the returned ids, which
    /// the caller should pass to [`ChannelRegistry::drop_session`].
    pub async fn broadcast(&self, channel_id: i64, event: &ServerEvent) -> Vec<SessionId> {
        let targets: Vec<(SessionId, mpsc::Sender<ServerEvent>)> = {
            let rooms = self.rooms.lock().await;
            match rooms.get(&channel_id) {
                Some(room) => room.iter().map(|(id, tx)| (*id, tx.clone())).collect(),
                None => return Vec::new(),
            }
        };

        let mut dead = Vec::new();
        for (session_id, tx) in targets {
            if tx.try_send(event.clone()).is_err() {
                debug!(channel_id, %session_id, "failed to deliver event to session");
                dead.push(session_id);
            }
        }
        dead
    }

    /// Number of sessions currently in a room
    pub async fn room_size(&self, channel_id: i64) -> usize {
        self.rooms
            .lock()
            .await
            .get(&channel_id)
            .map_or(0, HashMap::len)
    }
}
