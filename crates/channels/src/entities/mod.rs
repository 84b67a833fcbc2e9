//! Entity types for channels and messages.

pub mod channel;
pub mod message;

pub use channel::{Channel, CreateChannelRequest};
pub use message::Message;
