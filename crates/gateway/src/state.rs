//! Shared application state for the gateway

use std::sync::Arc;

use sqlx::SqlitePool;

use huddle_directory::Directory;

use crate::messaging::ChatGateway;

/// Shared application state: the messaging gateway plus the user/group
/// directory it consumes as an external collaborator.
#[derive(Clone)]
pub struct AppState {
    chat: Arc<ChatGateway>,
    directory: Arc<Directory>,
}

impl AppState {
    /// Create the state for a server instance. The gateway's room registry
    /// starts empty; it is rebuilt as sessions join.
    pub fn new(pool: SqlitePool, directory: Arc<Directory>) -> Self {
        Self {
            chat: Arc::new(ChatGateway::new(pool)),
            directory,
        }
    }

    /// The messaging gateway
    pub fn chat(&self) -> &Arc<ChatGateway> {
        &self.chat
    }

    /// The user and group directory
    pub fn directory(&self) -> &Directory {
        &self.directory
    }
}
