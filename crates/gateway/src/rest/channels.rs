//! Channel management endpoints.
//!
//! Channel create and delete carry a two-write obligation: the channel row
//! in the store, and the id entry in the owning group's channel list. That
//! second write belongs to this layer, not to the message store.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use huddle_channels::{Channel, CreateChannelRequest};

use crate::error::GatewayResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateChannelBody {
    pub group_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub ok: bool,
    pub channel: Channel,
}

#[derive(Debug, Serialize)]
pub struct ChannelsResponse {
    pub ok: bool,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChannelMemberBody {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub ok: bool,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/channels", post(create_channel))
        .route("/groups/:group_id/channels", get(list_group_channels))
        .route(
            "/groups/:group_id/channels/:channel_id",
            axum::routing::delete(delete_channel),
        )
        .route("/channels/:channel_id/users", post(add_channel_member))
        .route(
            "/channels/:channel_id/users/:username",
            axum::routing::delete(remove_channel_member),
        )
}

async fn create_channel(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateChannelBody>,
) -> GatewayResult<Json<ChannelResponse>> {
    // The owning group must exist before the channel row is written.
    state.directory().group(&body.group_id).await?;

    let request = CreateChannelRequest {
        group_id: body.group_id,
        name: body.name,
    };
    let channel = state.chat().create_channel(&request).await?;

    state
        .directory()
        .add_channel_to_group(&channel.group_id, channel.id)
        .await?;

    Ok(Json(ChannelResponse { ok: true, channel }))
}

async fn list_group_channels(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
) -> GatewayResult<Json<ChannelsResponse>> {
    let ids = state.directory().channel_ids(&group_id).await?;
    let channels = state.chat().channels_by_ids(&ids).await?;
    Ok(Json(ChannelsResponse { ok: true, channels }))
}

async fn delete_channel(
    State(state): State<Arc<AppState>>,
    Path((group_id, channel_id)): Path<(String, i64)>,
) -> GatewayResult<Json<DeletedResponse>> {
    state.chat().delete_channel(channel_id).await?;
    state
        .directory()
        .remove_channel_from_group(&group_id, channel_id)
        .await?;
    Ok(Json(DeletedResponse { ok: true }))
}

async fn add_channel_member(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<i64>,
    Json(body): Json<ChannelMemberBody>,
) -> GatewayResult<Json<MembershipResponse>> {
    state.chat().add_member(channel_id, &body.username).await?;
    Ok(Json(MembershipResponse { ok: true }))
}

async fn remove_channel_member(
    State(state): State<Arc<AppState>>,
    Path((channel_id, username)): Path<(i64, String)>,
) -> GatewayResult<Json<MembershipResponse>> {
    state.chat().remove_member(channel_id, &username).await?;
    Ok(Json(MembershipResponse { ok: true }))
}
