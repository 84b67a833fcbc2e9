//! Error types for channel and message storage.

use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Main error type for channel and message storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Channel not found: {id}")]
    ChannelNotFound { id: i64 },

    #[error("Validation error: {message}")]
    InvalidInput { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Create a not found error for channels
    pub fn channel_not_found(id: i64) -> Self {
        Self::ChannelNotFound { id }
    }

    /// Create a validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether this error means the channel is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChannelNotFound { .. })
    }
}
