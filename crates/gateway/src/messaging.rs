//! The messaging gateway: the single entry point for both the synchronous
//! request path and the live-connection path.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::debug;

use huddle_channels::{Channel, CreateChannelRequest, Message, MessageStore, StoreResult};

use crate::protocol::ServerEvent;
use crate::registry::ChannelRegistry;

/// Accepts sends from either path, appends to the message store, and fans
/// the result out to the channel's live room.
///
/// A per-channel lock spans append and broadcast, so for a single channel
/// the order in which sends are accepted is the order they land in the log
/// and the order they are broadcast. Different channels never contend.
pub struct ChatGateway {
    store: MessageStore,
    registry: ChannelRegistry,
    send_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatGateway {
    /// Create a gateway over a database pool with an empty room registry
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            store: MessageStore::new(pool),
            registry: ChannelRegistry::new(),
            send_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The live room registry
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    /// The underlying message store
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    async fn send_lock(&self, channel_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.send_locks.lock().await;
        locks.entry(channel_id).or_default().clone()
    }

    /// Append a message and fan it out to the channel's room.
    ///
    /// The append is durable and visible to [`ChatGateway::load_history`]
    /// before the first delivery is attempted, so a client that polls right
    /// after receiving the broadcast never sees a shorter history than what
    /// was broadcast. Delivery failures are session-local: the failed
    /// sessions are dropped from the registry and the sender never observes
    /// them.
    pub async fn send_message(
        &self,
        channel_id: i64,
        sender: &str,
        text: &str,
    ) -> StoreResult<Message> {
        let lock = self.send_lock(channel_id).await;
        let _guard = lock.lock().await;

        let message = self.store.append(channel_id, sender, text).await?;

        let event = ServerEvent::message(&message);
        let dead = self.registry.broadcast(channel_id, &event).await;
        for session_id in dead {
            debug!(channel_id, %session_id, "evicting unreachable session");
            self.registry.drop_session(session_id).await;
        }

        Ok(message)
    }

    /// A channel's full message history in log order
    pub async fn load_history(&self, channel_id: i64) -> StoreResult<Vec<Message>> {
        self.store.list(channel_id).await
    }

    /// Create a channel
    pub async fn create_channel(&self, request: &CreateChannelRequest) -> StoreResult<Channel> {
        self.store.create_channel(request).await
    }

    /// Delete a channel and discard its live room, so no further fan-out
    /// targets it
    pub async fn delete_channel(&self, channel_id: i64) -> StoreResult<()> {
        self.store.delete_channel(channel_id).await?;
        self.registry.evict(channel_id).await;
        self.send_locks.lock().await.remove(&channel_id);
        Ok(())
    }

    /// Fetch a channel by id
    pub async fn channel(&self, channel_id: i64) -> StoreResult<Channel> {
        self.store.channel(channel_id).await
    }

    /// Fetch the channels with the given ids
    pub async fn channels_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Channel>> {
        self.store.channels_by_ids(ids).await
    }

    /// Add a username to a channel's persisted member set
    pub async fn add_member(&self, channel_id: i64, username: &str) -> StoreResult<()> {
        self.store.add_member(channel_id, username).await
    }

    /// Remove a username from a channel's persisted member set
    pub async fn remove_member(&self, channel_id: i64, username: &str) -> StoreResult<()> {
        self.store.remove_member(channel_id, username).await
    }

    /// Emit a best-effort system notice to a channel's room. Never
    /// persisted; delivery failures evict the affected sessions.
    pub async fn notify(&self, channel_id: i64, text: &str) {
        let event = ServerEvent::notice(channel_id, text);
        let dead = self.registry.broadcast(channel_id, &event).await;
        for session_id in dead {
            self.registry.drop_session(session_id).await;
        }
    }
}
