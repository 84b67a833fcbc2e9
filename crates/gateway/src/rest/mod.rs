//! Synchronous request surface.

pub mod auth;
pub mod channels;
pub mod groups;
pub mod health;
pub mod messages;
pub mod users;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the REST routes
pub fn create_rest_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(users::routes())
        .merge(groups::routes())
        .merge(channels::routes())
        .merge(messages::routes())
}
