//! JSON-file user and group stores.
//!
//! Every mutation rewrites the backing file before the call returns, so the
//! on-disk state is always the current state. Both stores share one lock;
//! directory traffic is administrative CRUD and never sits on the message
//! fan-out path.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use huddle_config::DirectoryConfig;

use crate::entities::{CreateGroupRequest, CreateUserRequest, Group, User, UserProfile};
use crate::types::{DirectoryError, DirectoryResult};

const DEFAULT_PASSWORD: &str = "default_password";

#[derive(Default)]
struct State {
    users: Vec<User>,
    groups: Vec<Group>,
}

/// The user and group directory, backed by `users.json` and `groups.json`
pub struct Directory {
    users_path: PathBuf,
    groups_path: PathBuf,
    inner: Mutex<State>,
}

impl Directory {
    /// Load the directory from the configured file paths. Missing files are
    /// treated as empty stores and created on first write.
    pub async fn load(config: &DirectoryConfig) -> DirectoryResult<Self> {
        let users_path = PathBuf::from(&config.users_path);
        let groups_path = PathBuf::from(&config.groups_path);

        let users: Vec<User> = read_json(&users_path).await?.unwrap_or_default();
        let groups: Vec<Group> = read_json(&groups_path).await?.unwrap_or_default();

        info!(
            users = users.len(),
            groups = groups.len(),
            users_path = %users_path.display(),
            groups_path = %groups_path.display(),
            "directory loaded"
        );

        Ok(Self {
            users_path,
            groups_path,
            inner: Mutex::new(State { users, groups }),
        })
    }

    /// Check a username/password pair and return the matching profile.
    ///
    /// An unknown username and a wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, username: &str, password: &str) -> DirectoryResult<UserProfile> {
        let state = self.inner.lock().await;
        state
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .map(User::profile)
            .ok_or(DirectoryError::InvalidCredentials)
    }

    /// Create a user with the directory's default password
    pub async fn create_user(&self, request: &CreateUserRequest) -> DirectoryResult<UserProfile> {
        request
            .validate()
            .map_err(DirectoryError::invalid_input)?;

        let mut state = self.inner.lock().await;

        if state.users.iter().any(|u| u.username == request.username) {
            return Err(DirectoryError::DuplicateUsername {
                username: request.username.clone(),
            });
        }

        let user = User {
            id: next_id(state.users.iter().map(|u| u.id.as_str())),
            username: request.username.clone(),
            email: request.email.clone(),
            password: DEFAULT_PASSWORD.to_string(),
            roles: vec![request.role],
            groups: Vec::new(),
        };

        state.users.push(user.clone());
        write_json(&self.users_path, &state.users).await?;

        info!(username = %user.username, "created user");
        Ok(user.profile())
    }

    /// Insert a fully specified user record if the username is free.
    /// Returns false when the user already existed. Used for seeding.
    pub async fn ensure_user(&self, user: User) -> DirectoryResult<bool> {
        let mut state = self.inner.lock().await;

        if state.users.iter().any(|u| u.username == user.username) {
            return Ok(false);
        }

        state.users.push(user);
        write_json(&self.users_path, &state.users).await?;
        Ok(true)
    }

    /// Delete a user by id and return the removed profile
    pub async fn delete_user(&self, id: &str) -> DirectoryResult<UserProfile> {
        let mut state = self.inner.lock().await;

        let index = state
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| DirectoryError::user_not_found(id))?;

        let removed = state.users.remove(index);
        write_json(&self.users_path, &state.users).await?;

        info!(username = %removed.username, "deleted user");
        Ok(removed.profile())
    }

    /// Look up a user by username
    pub async fn user(&self, username: &str) -> DirectoryResult<UserProfile> {
        let state = self.inner.lock().await;
        state
            .users
            .iter()
            .find(|u| u.username == username)
            .map(User::profile)
            .ok_or_else(|| DirectoryError::user_not_found(username))
    }

    /// List the groups visible to a username: all of them for a Super
    /// Admin, otherwise only the groups the user belongs to.
    pub async fn groups_for(&self, username: &str) -> DirectoryResult<Vec<Group>> {
        let state = self.inner.lock().await;

        let user = state
            .users
            .iter()
            .find(|u| u.username == username)
            .ok_or_else(|| DirectoryError::user_not_found(username))?;

        if user.is_super_admin() {
            return Ok(state.groups.clone());
        }

        Ok(state
            .groups
            .iter()
            .filter(|g| user.groups.contains(&g.group_id))
            .cloned()
            .collect())
    }

    /// Create a group with the requesting admin as its first administrator
    pub async fn create_group(&self, request: &CreateGroupRequest) -> DirectoryResult<Group> {
        request
            .validate()
            .map_err(DirectoryError::invalid_input)?;

        let mut state = self.inner.lock().await;

        let group = Group {
            group_id: next_id(state.groups.iter().map(|g| g.group_id.as_str())),
            name: request.name.clone(),
            admins: vec![request.admin.clone()],
            channels: Vec::new(),
        };

        state.groups.push(group.clone());
        write_json(&self.groups_path, &state.groups).await?;

        info!(group_id = %group.group_id, name = %group.name, "created group");
        Ok(group)
    }

    /// Fetch a group by id
    pub async fn group(&self, group_id: &str) -> DirectoryResult<Group> {
        let state = self.inner.lock().await;
        state
            .groups
            .iter()
            .find(|g| g.group_id == group_id)
            .cloned()
            .ok_or_else(|| DirectoryError::group_not_found(group_id))
    }

    /// Add a user to a group. The acting user must carry an admin role.
    /// Re-adding an existing member succeeds without effect.
    pub async fn add_user_to_group(
        &self,
        group_id: &str,
        username: &str,
        actor: &str,
    ) -> DirectoryResult<()> {
        let mut state = self.inner.lock().await;

        if !state.groups.iter().any(|g| g.group_id == group_id) {
            return Err(DirectoryError::group_not_found(group_id));
        }

        let permitted = state
            .users
            .iter()
            .any(|u| u.username == actor && u.is_admin());
        if !permitted {
            return Err(DirectoryError::not_permitted(
                "Only Group Admins or Super Admins can add users to a group",
            ));
        }

        let user = state
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| DirectoryError::user_not_found(username))?;

        let group_id = group_id.to_string();
        if user.groups.contains(&group_id) {
            debug!(%group_id, username, "user already in group");
            return Ok(());
        }

        user.groups.push(group_id);
        write_json(&self.users_path, &state.users).await?;
        Ok(())
    }

    /// Remove a user from a group. Removing a non-member is a no-op.
    pub async fn remove_user_from_group(
        &self,
        group_id: &str,
        username: &str,
    ) -> DirectoryResult<()> {
        let mut state = self.inner.lock().await;

        let user = state
            .users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| DirectoryError::user_not_found(username))?;

        user.groups.retain(|g| g != group_id);
        write_json(&self.users_path, &state.users).await?;
        Ok(())
    }

    /// The channel ids owned by a group
    pub async fn channel_ids(&self, group_id: &str) -> DirectoryResult<Vec<i64>> {
        self.group(group_id).await.map(|g| g.channels)
    }

    /// Record a newly created channel on its owning group
    pub async fn add_channel_to_group(
        &self,
        group_id: &str,
        channel_id: i64,
    ) -> DirectoryResult<()> {
        let mut state = self.inner.lock().await;

        let group = state
            .groups
            .iter_mut()
            .find(|g| g.group_id == group_id)
            .ok_or_else(|| DirectoryError::group_not_found(group_id))?;

        if !group.channels.contains(&channel_id) {
            group.channels.push(channel_id);
        }
        write_json(&self.groups_path, &state.groups).await?;
        Ok(())
    }

    /// Remove a deleted channel from its owning group's list
    pub async fn remove_channel_from_group(
        &self,
        group_id: &str,
        channel_id: i64,
    ) -> DirectoryResult<()> {
        let mut state = self.inner.lock().await;

        let group = state
            .groups
            .iter_mut()
            .find(|g| g.group_id == group_id)
            .ok_or_else(|| DirectoryError::group_not_found(group_id))?;

        group.channels.retain(|c| *c != channel_id);
        write_json(&self.groups_path, &state.groups).await?;
        Ok(())
    }
}

/// Ids are a 1-based counter rendered as a string, one past the highest id
/// currently in use.
fn next_id<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let max = ids.filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0);
    (max + 1).to_string()
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> DirectoryResult<Option<T>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> DirectoryResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(path, bytes).await?;
    Ok(())
}
