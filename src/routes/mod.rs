//! Router construction and cross-origin policy

pub mod api;
pub mod ws;

use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

/// Development origins permitted for browser-based clients
const ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:5500",
    "http://127.0.0.1:5500",
    "http://localhost:8000",
    "http://127.0.0.1:8000",
];

/// Cross-origin policy for browser-based clients
///
/// All methods and headers are permitted from the allow-listed origins.
/// Methods and headers mirror the request because credentialed responses
/// cannot use wildcards.
pub fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .map(|origin| HeaderValue::from_static(origin))
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
