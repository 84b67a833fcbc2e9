//! Error types for the directory.

use thiserror::Error;

/// Result type alias for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Main error type for the user and group directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("User not found: {name}")]
    UserNotFound { name: String },

    #[error("Group not found: {id}")]
    GroupNotFound { id: String },

    #[error("Username already exists: {username}")]
    DuplicateUsername { username: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not permitted: {reason}")]
    NotPermitted { reason: String },

    #[error("Validation error: {message}")]
    InvalidInput { message: String },

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl DirectoryError {
    /// Create a not found error for users
    pub fn user_not_found(name: impl Into<String>) -> Self {
        Self::UserNotFound { name: name.into() }
    }

    /// Create a not found error for groups
    pub fn group_not_found(id: impl Into<String>) -> Self {
        Self::GroupNotFound { id: id.into() }
    }

    /// Create a not permitted error
    pub fn not_permitted(reason: impl Into<String>) -> Self {
        Self::NotPermitted {
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
