//! Message endpoints.
//!
//! Posting goes through the same gateway as the live path, so a message
//! accepted here is broadcast to the channel's room exactly like one sent
//! over a WebSocket, in the same per-channel order.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use huddle_channels::Message;

use crate::error::GatewayResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PostMessageBody {
    pub sender: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: MessagePayload,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub ok: bool,
    pub messages: Vec<MessagePayload>,
}

/// The wire shape of one stored message
#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub channel_id: i64,
    pub seq: i64,
    pub sender: String,
    pub text: String,
    pub timestamp: String,
}

impl From<Message> for MessagePayload {
    fn from(message: Message) -> Self {
        Self {
            channel_id: message.channel_id,
            seq: message.seq,
            sender: message.sender,
            text: message.body,
            timestamp: message.created_at,
        }
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/channels/:channel_id/messages",
        get(list_messages).post(post_message),
    )
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<i64>,
    Json(body): Json<PostMessageBody>,
) -> GatewayResult<Json<MessageResponse>> {
    let message = state
        .chat()
        .send_message(channel_id, &body.sender, &body.text)
        .await?;

    Ok(Json(MessageResponse {
        ok: true,
        message: message.into(),
    }))
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(channel_id): Path<i64>,
) -> GatewayResult<Json<MessagesResponse>> {
    let messages = state.chat().load_history(channel_id).await?;

    Ok(Json(MessagesResponse {
        ok: true,
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}
