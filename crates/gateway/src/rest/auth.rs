//! Login endpoint.
//!
//! A credential match against the directory, nothing more. Session tokens
//! and credential hardening are out of scope; callers are trusted with the
//! identity they present afterwards.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use huddle_directory::UserProfile;

use crate::error::GatewayResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub user: UserProfile,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> GatewayResult<Json<LoginResponse>> {
    let user = state
        .directory()
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse { ok: true, user }))
}
