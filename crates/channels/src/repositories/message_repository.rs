//! Repository for message data access operations.

use crate::entities::Message;
use crate::types::{StoreError, StoreResult};
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message to a channel's log.
    ///
    /// The channel-existence check, the sequence computation, and the insert
    /// run in one transaction: an append racing a channel deletion either
    /// commits before the delete (and cascades away with it) or observes the
    /// deletion and fails with `ChannelNotFound`. The log itself is never
    /// left partially written.
    pub async fn append(&self, channel_id: i64, sender: &str, body: &str) -> StoreResult<Message> {
        let mut tx = self.pool.begin().await?;

        let channel = sqlx::query("SELECT id FROM channels WHERE id = ?")
            .bind(channel_id)
            .fetch_optional(&mut *tx)
            .await?;

        if channel.is_none() {
            return Err(StoreError::channel_not_found(channel_id));
        }

        let row = sqlx::query(
            "SELECT COALESCE(MAX(seq) + 1, 0) AS next_seq FROM messages WHERE channel_id = ?",
        )
        .bind(channel_id)
        .fetch_one(&mut *tx)
        .await?;
        let seq: i64 = row.try_get("next_seq")?;

        let created_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO messages (channel_id, seq, sender, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(channel_id)
        .bind(seq)
        .bind(sender)
        .bind(body)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(channel_id, seq, sender, "appended message");

        Ok(Message {
            channel_id,
            seq,
            sender: sender.to_string(),
            body: body.to_string(),
            created_at,
        })
    }

    /// List a channel's messages in log order
    pub async fn list_for_channel(&self, channel_id: i64) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT channel_id, seq, sender, body, created_at
             FROM messages WHERE channel_id = ? ORDER BY seq ASC",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Message {
                    channel_id: row.try_get("channel_id")?,
                    seq: row.try_get("seq")?,
                    sender: row.try_get("sender")?,
                    body: row.try_get("body")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
