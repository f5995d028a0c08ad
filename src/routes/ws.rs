use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::ws;
use crate::state::AppState;
use std::sync::Arc;

/// Create the WebSocket router
///
/// The `/ws` endpoint is intentionally unauthenticated: the server is meant
/// to sit behind a reverse proxy in anything beyond development, and the
/// transcript it accumulates is ephemeral per connection.
pub fn create_ws_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(ws::ws_chat_handler))
        .layer(TraceLayer::new_for_http())
}
