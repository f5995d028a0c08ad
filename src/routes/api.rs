use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::proxy;
use crate::state::AppState;
use std::sync::Arc;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/proxy/audio", get(proxy::proxy_audio))
        .layer(TraceLayer::new_for_http())
}
