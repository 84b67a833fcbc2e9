//! # Huddle Gateway Crate
//!
//! The protocol-facing layer of the Huddle chat backend. It exposes two
//! surfaces over one shared [`ChatGateway`]:
//!
//! - **REST**: login, user/group CRUD, channel management, and synchronous
//!   message post/list
//! - **WebSocket**: join/leave/send events per live connection, with
//!   message and notice fan-out to channel rooms
//!
//! Both paths funnel sends through the same gateway instance, so for any
//! single channel they observe one total order of appends and broadcasts.

pub mod error;
pub mod messaging;
pub mod protocol;
pub mod registry;
pub mod rest;
pub mod session;
pub mod state;
pub mod websocket;

pub use error::{GatewayError, GatewayResult};
pub use messaging::ChatGateway;
pub use protocol::{ClientEvent, ServerEvent};
pub use registry::{ChannelRegistry, SessionId, SESSION_BUFFER};
pub use session::Session;
pub use state::AppState;

use axum::{http::Method, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Create the main application router with all routes
pub fn create_router(state: AppState) -> Router {
    let arc_state = Arc::new(state);

    Router::new()
        .nest("/api", rest::create_rest_routes())
        .merge(websocket::create_websocket_routes())
        .with_state(arc_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers(Any),
        )
}
