use serde::{Deserialize, Serialize};

/// A named ordered message stream scoped to one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Store-assigned identity. Monotonically increasing and stable for the
    /// lifetime of the store; opaque to everything outside it.
    pub id: i64,
    /// Owning group identity.
    pub group_id: String,
    /// Display name
    pub name: String,
    /// Persisted member usernames. Distinct from live room membership: a
    /// user can be a channel member without an open connection.
    pub members: Vec<String>,
    /// Creation timestamp
    pub created_at: String,
}

/// Request to create a new channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChannelRequest {
    pub group_id: String,
    pub name: String,
}

impl CreateChannelRequest {
    /// Validate the create request
    pub fn validate(&self) -> Result<(), String> {
        if self.group_id.trim().is_empty() {
            return Err("Group id cannot be empty".to_string());
        }

        if self.name.trim().is_empty() {
            return Err("Channel name cannot be empty".to_string());
        }

        Ok(())
    }
}
