//! Per-connection session state machine.
//!
//! `Connected → (Joined channel)* → Disconnected`. The transport layer owns
//! the session and drives it with decoded [`ClientEvent`]s; the session in
//! turn registers with the room registry and delegates sends to the
//! gateway. It never touches the message store directly.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use huddle_channels::StoreError;

use crate::messaging::ChatGateway;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::registry::SessionId;

/// One live client connection's application-level state
pub struct Session {
    id: SessionId,
    gateway: Arc<ChatGateway>,
    out: mpsc::Sender<ServerEvent>,
    joined: HashSet<i64>,
    disconnected: bool,
}

impl Session {
    /// Create a session for a freshly established connection. No room
    /// memberships yet.
    pub fn new(gateway: Arc<ChatGateway>, out: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            gateway,
            out,
            joined: HashSet::new(),
            disconnected: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Dispatch one decoded client event
    pub async fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Join {
                channel_id,
                username,
            } => self.on_join(channel_id, &username).await,
            ClientEvent::Leave {
                channel_id,
                username,
            } => self.on_leave(channel_id, &username).await,
            ClientEvent::Send {
                channel_id,
                sender,
                text,
            } => self.on_send(channel_id, &sender, &text).await,
        }
    }

    /// Join a channel room and announce it to the members already there
    pub async fn on_join(&mut self, channel_id: i64, username: &str) {
        if self.rejects("join") {
            return;
        }

        if let Err(err) = self.gateway.channel(channel_id).await {
            self.report(err).await;
            return;
        }

        if self.joined.contains(&channel_id) {
            // Already in the room; just re-acknowledge.
            let _ = self.out.send(ServerEvent::Joined { channel_id }).await;
            return;
        }

        // Announce before registering so the joiner never sees its own notice.
        self.gateway
            .notify(channel_id, &format!("{username} has joined the channel."))
            .await;

        self.gateway
            .registry()
            .join(channel_id, self.id, self.out.clone())
            .await;
        self.joined.insert(channel_id);

        let _ = self.out.send(ServerEvent::Joined { channel_id }).await;
    }

    /// Leave a channel room and announce it to the remaining members
    pub async fn on_leave(&mut self, channel_id: i64, username: &str) {
        if self.rejects("leave") {
            return;
        }

        let was_member = self.joined.remove(&channel_id);
        self.gateway.registry().leave(channel_id, self.id).await;

        if was_member {
            // Announce after unregistering so the leaver is excluded.
            self.gateway
                .notify(channel_id, &format!("{username} has left the channel."))
                .await;
        }

        let _ = self.out.send(ServerEvent::Left { channel_id }).await;
    }

    /// Send a message through the gateway. A failing send is reported on
    /// this session only; the connection stays open.
    pub async fn on_send(&mut self, channel_id: i64, sender: &str, text: &str) {
        if self.rejects("send") {
            return;
        }

        if let Err(err) = self.gateway.send_message(channel_id, sender, text).await {
            self.report(err).await;
        }
    }

    /// Terminal transition. Releases every room membership exactly once;
    /// events arriving afterwards are protocol violations and are discarded.
    pub async fn on_disconnect(&mut self) {
        if self.disconnected {
            warn!(session_id = %self.id, "duplicate disconnect ignored");
            return;
        }
        self.disconnected = true;

        self.gateway.registry().drop_session(self.id).await;
        self.joined.clear();
    }

    fn rejects(&self, event: &str) -> bool {
        if self.disconnected {
            warn!(session_id = %self.id, event, "discarding event after disconnect");
        }
        self.disconnected
    }

    async fn report(&self, err: StoreError) {
        let code = match &err {
            StoreError::ChannelNotFound { .. } => "not_found",
            StoreError::InvalidInput { .. } => "invalid_input",
            StoreError::Database(_) => "internal",
        };
        let _ = self
            .out
            .send(ServerEvent::error(code, err.to_string()))
            .await;
    }
}
