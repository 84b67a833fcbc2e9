//! Entity types for the user and group directory.

pub mod group;
pub mod user;

pub use group::{CreateGroupRequest, Group};
pub use user::{CreateUserRequest, Role, User, UserProfile};
