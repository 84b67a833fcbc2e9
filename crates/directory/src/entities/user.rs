use serde::{Deserialize, Serialize};

/// A user record as persisted in `users.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Stored as supplied. Credential hardening is out of scope; the login
    /// route strips this field from its response.
    pub password: String,
    pub roles: Vec<Role>,
    /// Group ids this user belongs to
    pub groups: Vec<String>,
}

/// Role enumeration. Serialized with the directory's historical spellings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "Group Admin")]
    GroupAdmin,
    User,
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            "Super Admin" => Role::SuperAdmin,
            "Group Admin" => Role::GroupAdmin,
            _ => Role::User,
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::SuperAdmin => "Super Admin".to_string(),
            Role::GroupAdmin => "Group Admin".to_string(),
            Role::User => "User".to_string(),
        }
    }
}

/// A user as exposed to callers: the stored record minus its password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub groups: Vec<String>,
}

impl User {
    /// Check whether this user carries the Super Admin role
    pub fn is_super_admin(&self) -> bool {
        self.roles.contains(&Role::SuperAdmin)
    }

    /// Check whether this user may administer groups
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::SuperAdmin) || self.roles.contains(&Role::GroupAdmin)
    }

    /// The externally visible view of this record
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            roles: self.roles.clone(),
            groups: self.groups.clone(),
        }
    }
}

/// Request to create a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl CreateUserRequest {
    /// Validate the create request
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("Username cannot be empty".to_string());
        }

        if !self.email.contains('@') {
            return Err("Email address is invalid".to_string());
        }

        Ok(())
    }
}
