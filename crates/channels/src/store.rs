//! The durable message store: ordered append-only logs per channel.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::entities::{Channel, CreateChannelRequest, Message};
use crate::repositories::{ChannelRepository, MessageRepository};
use crate::types::{StoreError, StoreResult};

/// Durable, ordered, append-only log of messages per channel. The single
/// source of truth for message history.
///
/// Appends to the same channel serialize through a per-channel mutex into a
/// single total order; appends to different channels take different mutexes
/// and do not contend at this level. An appended message is visible to all
/// subsequent [`MessageStore::list`] calls before `append` returns.
pub struct MessageStore {
    channels: ChannelRepository,
    messages: MessageRepository,
    append_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl MessageStore {
    /// Create a store over the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            channels: ChannelRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
            append_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn append_lock(&self, channel_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.append_locks.lock().await;
        locks.entry(channel_id).or_default().clone()
    }

    /// Append a message to a channel's log.
    ///
    /// Fails with [`StoreError::ChannelNotFound`] if the channel does not
    /// exist or its deletion has already committed, and with
    /// [`StoreError::InvalidInput`] on a blank sender or body.
    pub async fn append(&self, channel_id: i64, sender: &str, body: &str) -> StoreResult<Message> {
        if sender.trim().is_empty() {
            return Err(StoreError::invalid_input("Sender cannot be empty"));
        }
        if body.trim().is_empty() {
            return Err(StoreError::invalid_input("Message text cannot be empty"));
        }

        let lock = self.append_lock(channel_id).await;
        let _guard = lock.lock().await;

        self.messages.append(channel_id, sender, body).await
    }

    /// List a channel's messages in arrival order.
    ///
    /// Fails with [`StoreError::ChannelNotFound`] for an unknown channel; an
    /// existing channel with no messages yields an empty list, not an error.
    pub async fn list(&self, channel_id: i64) -> StoreResult<Vec<Message>> {
        if !self.channels.exists(channel_id).await? {
            return Err(StoreError::channel_not_found(channel_id));
        }
        self.messages.list_for_channel(channel_id).await
    }

    /// Create a channel. The caller owns the follow-up write that records
    /// the new id in the owning group's channel list.
    pub async fn create_channel(&self, request: &CreateChannelRequest) -> StoreResult<Channel> {
        request.validate().map_err(StoreError::invalid_input)?;
        self.channels.create(&request.group_id, &request.name).await
    }

    /// Delete a channel and its message log.
    ///
    /// Once the deletion commits, new appends to the channel fail with
    /// [`StoreError::ChannelNotFound`]; appends already committed cascade
    /// away with the log.
    pub async fn delete_channel(&self, channel_id: i64) -> StoreResult<()> {
        if !self.channels.delete(channel_id).await? {
            return Err(StoreError::channel_not_found(channel_id));
        }

        self.append_locks.lock().await.remove(&channel_id);
        Ok(())
    }

    /// Fetch a channel by id
    pub async fn channel(&self, channel_id: i64) -> StoreResult<Channel> {
        self.channels
            .find(channel_id)
            .await?
            .ok_or_else(|| StoreError::channel_not_found(channel_id))
    }

    /// Fetch the channels with the given ids, in id order
    pub async fn channels_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Channel>> {
        self.channels.list_by_ids(ids).await
    }

    /// Add a username to a channel's persisted member set. Adding an
    /// existing member succeeds without effect.
    pub async fn add_member(&self, channel_id: i64, username: &str) -> StoreResult<()> {
        if username.trim().is_empty() {
            return Err(StoreError::invalid_input("Username cannot be empty"));
        }
        self.channels.add_member(channel_id, username).await
    }

    /// Remove a username from a channel's persisted member set. Removing an
    /// absent member succeeds without effect.
    pub async fn remove_member(&self, channel_id: i64, username: &str) -> StoreResult<()> {
        self.channels.remove_member(channel_id, username).await
    }
}
