//! User management endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use huddle_directory::{CreateUserRequest, Role, UserProfile};

use crate::error::GatewayResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub username: String,
    pub email: String,
    /// Role name; unknown values fall back to the plain User role
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub ok: bool,
    pub user: UserProfile,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:user_id", axum::routing::delete(delete_user))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserBody>,
) -> GatewayResult<Json<UserResponse>> {
    let request = CreateUserRequest {
        username: body.username,
        email: body.email,
        role: Role::from(body.role.as_str()),
    };

    let user = state.directory().create_user(&request).await?;
    Ok(Json(UserResponse { ok: true, user }))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> GatewayResult<Json<UserResponse>> {
    let user = state.directory().delete_user(&user_id).await?;
    Ok(Json(UserResponse { ok: true, user }))
}
