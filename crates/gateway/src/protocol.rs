//! Wire protocol for the live-connection surface.
//!
//! A closed set of tagged variants, decoded once at the transport boundary.

use huddle_channels::Message;
use serde::{Deserialize, Serialize};

/// Client events received over a live connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Join a channel room
    Join { channel_id: i64, username: String },
    /// Leave a channel room
    Leave { channel_id: i64, username: String },
    /// Send a message to a channel
    Send {
        channel_id: i64,
        sender: String,
        text: String,
    },
}

/// Server events delivered to live connections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Welcome frame after connection establishment
    Hello { session_id: String },
    /// Join confirmation for the requesting session
    Joined { channel_id: i64 },
    /// Leave confirmation for the requesting session
    Left { channel_id: i64 },
    /// A persisted message fanned out to a room
    Message {
        channel_id: i64,
        seq: i64,
        sender: String,
        text: String,
        timestamp: String,
    },
    /// A room activity notice. Best-effort and never persisted.
    Notice {
        channel_id: i64,
        text: String,
        timestamp: String,
    },
    /// An event-level failure. The connection stays open.
    Error { code: String, message: String },
}

impl ServerEvent {
    /// The fan-out frame for a stored message
    pub fn message(message: &Message) -> Self {
        Self::Message {
            channel_id: message.channel_id,
            seq: message.seq,
            sender: message.sender.clone(),
            text: message.body.clone(),
            timestamp: message.created_at.clone(),
        }
    }

    /// A system notice stamped with the current server time
    pub fn notice(channel_id: i64, text: impl Into<String>) -> Self {
        Self::Notice {
            channel_id,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// An error frame
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}
