//! Data access repositories for channels and messages.

pub mod channel_repository;
pub mod message_repository;

pub use channel_repository::ChannelRepository;
pub use message_repository::MessageRepository;
