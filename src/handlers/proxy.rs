//! Audio relay endpoint
//!
//! Browser clients cannot fetch the generated audio directly: the voice host
//! neither allows cross-origin reads nor accepts the client's credentials.
//! This endpoint fetches the audio server-side and streams the bytes through
//! unmodified, rewriting only the response headers the player needs.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{error, info};
use url::Url;

use crate::core::cap_error_body;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters for the audio relay endpoint
#[derive(Debug, Deserialize)]
pub struct AudioProxyParams {
    /// Absolute URL of the audio resource (percent-encoded by the client)
    pub url: String,
}

/// Handler for `GET /proxy/audio?url=...`
///
/// Streams the referenced audio bytes back to the caller. Any upstream
/// failure maps to a 500 whose body message carries the upstream status, so
/// a browser console shows what actually went wrong.
pub async fn proxy_audio(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AudioProxyParams>,
) -> AppResult<Response> {
    let target = Url::parse(&params.url)
        .map_err(|e| AppError::BadRequest(format!("invalid audio url: {e}")))?;
    if !matches!(target.scheme(), "http" | "https") {
        return Err(AppError::BadRequest(format!(
            "unsupported audio url scheme: {}",
            target.scheme()
        )));
    }

    info!("Relaying audio from {}", target);

    let response = state.relay.get(target).send().await.map_err(|e| {
        error!("Audio fetch failed: {}", e);
        AppError::InternalServerError(format!("failed to fetch audio: {e}"))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error body".to_string());
        error!(
            "Audio fetch failed: upstream status {} - {}",
            status,
            cap_error_body(&body)
        );
        return Err(AppError::InternalServerError(format!(
            "failed to fetch audio: upstream status {status} - {}",
            cap_error_body(&body)
        )));
    }

    let content_length = response.headers().get(header::CONTENT_LENGTH).cloned();

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    if let Some(length) = content_length {
        headers.insert(header::CONTENT_LENGTH, length);
    }
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let body = Body::from_stream(response.bytes_stream());
    Ok((StatusCode::OK, headers, body).into_response())
}
