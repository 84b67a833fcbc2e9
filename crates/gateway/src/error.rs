//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use huddle_channels::StoreError;
use huddle_directory::DirectoryError;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::InternalError(_) | GatewayError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<StoreError> for GatewayError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::ChannelNotFound { id } => {
                GatewayError::NotFound(format!("Channel not found: {id}"))
            }
            StoreError::InvalidInput { message } => GatewayError::InvalidRequest(message),
            StoreError::Database(err) => GatewayError::DatabaseError(err.to_string()),
        }
    }
}

impl From<DirectoryError> for GatewayError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::UserNotFound { name } => {
                GatewayError::NotFound(format!("User not found: {name}"))
            }
            DirectoryError::GroupNotFound { id } => {
                GatewayError::NotFound(format!("Group not found: {id}"))
            }
            DirectoryError::DuplicateUsername { username } => {
                GatewayError::Conflict(format!("Username already exists: {username}"))
            }
            DirectoryError::InvalidCredentials => GatewayError::Unauthorized,
            DirectoryError::NotPermitted { reason } => GatewayError::Forbidden(reason),
            DirectoryError::InvalidInput { message } => GatewayError::InvalidRequest(message),
            DirectoryError::Io(err) => GatewayError::InternalError(err.to_string()),
            DirectoryError::Serde(err) => GatewayError::InternalError(err.to_string()),
        }
    }
}
