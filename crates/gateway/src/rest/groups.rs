//! Group management endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use huddle_directory::{CreateGroupRequest, Group};

use crate::error::GatewayResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListGroupsQuery {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub ok: bool,
    pub groups: Vec<Group>,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub ok: bool,
    pub group: Group,
}

#[derive(Debug, Deserialize)]
pub struct AddGroupMemberBody {
    pub username: String,
    /// Username of the acting administrator
    pub admin: String,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub ok: bool,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/:group_id/users", post(add_group_member))
        .route(
            "/groups/:group_id/users/:username",
            axum::routing::delete(remove_group_member),
        )
}

/// Groups visible to a username: all of them for a Super Admin, otherwise
/// only the groups the user belongs to.
async fn list_groups(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListGroupsQuery>,
) -> GatewayResult<Json<GroupsResponse>> {
    let groups = state.directory().groups_for(&query.username).await?;
    Ok(Json(GroupsResponse { ok: true, groups }))
}

async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateGroupRequest>,
) -> GatewayResult<Json<GroupResponse>> {
    let group = state.directory().create_group(&request).await?;
    Ok(Json(GroupResponse { ok: true, group }))
}

async fn add_group_member(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
    Json(body): Json<AddGroupMemberBody>,
) -> GatewayResult<Json<MembershipResponse>> {
    state
        .directory()
        .add_user_to_group(&group_id, &body.username, &body.admin)
        .await?;
    Ok(Json(MembershipResponse { ok: true }))
}

async fn remove_group_member(
    State(state): State<Arc<AppState>>,
    Path((group_id, username)): Path<(String, String)>,
) -> GatewayResult<Json<MembershipResponse>> {
    state
        .directory()
        .remove_user_from_group(&group_id, &username)
        .await?;
    Ok(Json(MembershipResponse { ok: true }))
}
