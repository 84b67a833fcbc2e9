use serde::{Deserialize, Serialize};

/// A group record as persisted in `groups.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub group_id: String,
    pub name: String,
    /// Usernames of the group's administrators
    pub admins: Vec<String>,
    /// Ids of the channels owned by this group. Maintained by the channel
    /// create/delete callers, not by the message store.
    pub channels: Vec<i64>,
}

/// Request to create a new group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    /// Username of the founding administrator
    pub admin: String,
}

impl CreateGroupRequest {
    /// Validate the create request
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Group name cannot be empty".to_string());
        }

        if self.admin.trim().is_empty() {
            return Err("Group admin cannot be empty".to_string());
        }

        Ok(())
    }
}
