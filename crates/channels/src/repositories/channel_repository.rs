//! Repository for channel data access operations.

use crate::entities::Channel;
use crate::types::{StoreError, StoreResult};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for channel database operations
#[derive(Clone)]
pub struct ChannelRepository {
    pool: SqlitePool,
}

impl ChannelRepository {
    /// Create a new channel repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new channel and return it with its store-assigned id
    pub async fn create(&self, group_id: &str, name: &str) -> StoreResult<Channel> {
        let created_at = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO channels (group_id, name, created_at) VALUES (?, ?, ?)",
        )
        .bind(group_id)
        .bind(name)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        let channel_id = result.last_insert_rowid();

        info!(channel_id, group_id, name, "created channel");

        Ok(Channel {
            id: channel_id,
            group_id: group_id.to_string(),
            name: name.to_string(),
            members: Vec::new(),
            created_at,
        })
    }

    /// Find a channel by id, including its persisted member set
    pub async fn find(&self, channel_id: i64) -> StoreResult<Option<Channel>> {
        let row = sqlx::query(
            "SELECT id, group_id, name, created_at FROM channels WHERE id = ?",
        )
        .bind(channel_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let members = self.members(channel_id).await?;

        Ok(Some(Channel {
            id: row.try_get("id")?,
            group_id: row.try_get("group_id")?,
            name: row.try_get("name")?,
            members,
            created_at: row.try_get("created_at")?,
        }))
    }

    /// Check whether a channel exists
    pub async fn exists(&self, channel_id: i64) -> StoreResult<bool> {
        let row = sqlx::query("SELECT id FROM channels WHERE id = ?")
            .bind(channel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Fetch the channels with the given ids, in id order
    pub async fn list_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Channel>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, group_id, name, created_at FROM channels WHERE id IN ({placeholders}) ORDER BY id"
        );

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut channels = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let members = self.members(id).await?;
            channels.push(Channel {
                id,
                group_id: row.try_get("group_id")?,
                name: row.try_get("name")?,
                members,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(channels)
    }

    /// Delete a channel. The message log and member set cascade with it.
    /// Returns false when the channel was already absent.
    pub async fn delete(&self, channel_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(channel_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(channel_id, "deleted channel");
        }
        Ok(deleted)
    }

    /// Add a username to the channel's persisted member set. Idempotent.
    pub async fn add_member(&self, channel_id: i64, username: &str) -> StoreResult<()> {
        if !self.exists(channel_id).await? {
            return Err(StoreError::channel_not_found(channel_id));
        }

        let added_at = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT OR IGNORE INTO channel_members (channel_id, username, added_at) VALUES (?, ?, ?)",
        )
        .bind(channel_id)
        .bind(username)
        .bind(&added_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a username from the channel's persisted member set. Removing
    /// an absent member is a no-op.
    pub async fn remove_member(&self, channel_id: i64, username: &str) -> StoreResult<()> {
        if !self.exists(channel_id).await? {
            return Err(StoreError::channel_not_found(channel_id));
        }

        sqlx::query("DELETE FROM channel_members WHERE channel_id = ? AND username = ?")
            .bind(channel_id)
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List the persisted member usernames for a channel
    pub async fn members(&self, channel_id: i64) -> StoreResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT username FROM channel_members WHERE channel_id = ? ORDER BY added_at, username",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.try_get("username").map_err(StoreError::from))
            .collect()
    }
}
