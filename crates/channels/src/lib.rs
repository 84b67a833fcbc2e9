//! # Huddle Channels Crate
//!
//! Channel and message storage for the Huddle chat backend. A channel is a
//! named ordered message stream owned by one group; this crate owns message
//! lifetime and ordering, exposed through [`MessageStore`].
//!
//! Live room membership is a separate concern handled by the gateway crate;
//! the persisted member sets stored here survive restarts and disconnects.

pub mod entities;
pub mod repositories;
pub mod store;
pub mod types;

pub use entities::{Channel, CreateChannelRequest, Message};
pub use repositories::{ChannelRepository, MessageRepository};
pub use store::MessageStore;
pub use types::{StoreError, StoreResult};
