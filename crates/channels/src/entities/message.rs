use serde::{Deserialize, Serialize};

/// A single entry in a channel's ordered message log.
///
/// Messages are immutable once created. The sender identity is recorded as
/// supplied; validating it against the user directory is the caller's
/// responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Owning channel
    pub channel_id: i64,
    /// Position in the owning channel's log. Dense and 0-based; assigned by
    /// the store in arrival order and never reassigned.
    pub seq: i64,
    /// Sender identity as supplied by the caller
    pub sender: String,
    /// Message text
    pub body: String,
    /// Server-assigned RFC 3339 timestamp, set at the moment of durable
    /// append. Never client-supplied.
    pub created_at: String,
}
