//! # Huddle Directory Crate
//!
//! The user and group directory: flat JSON files holding user records (with
//! roles and group memberships) and group records (with admins and owned
//! channel ids). This is administrative CRUD that the messaging core
//! consumes; it performs the directory's own permission checks but no
//! messaging authorization.

pub mod entities;
pub mod store;
pub mod types;

pub use entities::{CreateGroupRequest, CreateUserRequest, Group, Role, User, UserProfile};
pub use store::Directory;
pub use types::{DirectoryError, DirectoryResult};
