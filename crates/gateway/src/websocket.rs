//! WebSocket transport for live connections.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::protocol::{ClientEvent, ServerEvent};
use crate::registry::SESSION_BUFFER;
use crate::session::Session;
use crate::state::AppState;

/// Create the WebSocket routes
pub fn create_websocket_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(websocket_handler))
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one live connection: a writer task drains the session's outbound
/// queue while this task decodes and dispatches inbound events. Whatever
/// ends the connection, the session disconnects exactly once.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerEvent>(SESSION_BUFFER);

    let mut session = Session::new(Arc::clone(state.chat()), out_tx.clone());
    let session_id = session.id();
    info!(%session_id, "session connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(text) => {
                    if ws_tx.send(WsMessage::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(error) => warn!(%error, "failed to encode server event"),
            }
        }
    });

    let _ = out_tx
        .send(ServerEvent::Hello {
            session_id: session_id.to_string(),
        })
        .await;

    loop {
        tokio::select! {
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(WsMessage::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => session.handle(event).await,
                            Err(error) => {
                                warn!(%session_id, %error, "discarding malformed client event");
                                let _ = out_tx
                                    .send(ServerEvent::error(
                                        "invalid_event",
                                        "Malformed event payload",
                                    ))
                                    .await;
                            }
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {} // ping/pong/binary frames need no handling
                    Some(Err(error)) => {
                        warn!(%session_id, %error, "websocket receive error");
                        break;
                    }
                }
            }
            _ = &mut send_task => break,
        }
    }

    session.on_disconnect().await;
    send_task.abort();
    info!(%session_id, "session disconnected");
}
