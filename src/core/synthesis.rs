//! Voice synthesis client
//!
//! Client for the voice generation HTTP API. A synthesis call posts the
//! script to `/voice-actors/{voice_actor_id}/generate-voice` and extracts the
//! generated audio URL from the response.
//!
//! Transient failures are retried up to a configured attempt budget with a
//! fixed delay between attempts; the delay is an await point, so other
//! connections keep making progress while one session waits. A 401 means the
//! configured token is bad and is never retried. Each attempt is classified
//! into an explicit [`Attempt`] outcome consumed by the retry driver, so the
//! auth-vs-transient distinction is a branch rather than a shared error type.

use std::time::Duration;

use reqwest::{StatusCode, header};
use serde::Serialize;
use tracing::{debug, error, warn};

use super::cap_error_body;
use crate::config::ServerConfig;

/// Error types for voice synthesis operations
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// 401 from the voice API; the token is wrong and retrying cannot help
    #[error("voice API authentication failed: check the configured API token")]
    Auth,

    /// Non-success status from the voice API (retried before surfacing)
    #[error("voice API error: status {status} - {body}")]
    Api { status: StatusCode, body: String },

    /// Transport-level failure (connection error, timeout, DNS failure)
    #[error("network error calling voice API: {0}")]
    Network(String),

    /// A 200 response whose body did not contain the generated audio URL
    #[error("voice API returned an unexpected response body: {0}")]
    MalformedResponse(String),

    /// Client could not be constructed from the given configuration
    #[error("invalid synthesis client configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for synthesis operations
pub type SynthesisResult<T> = Result<T, SynthesisError>;

/// Outcome of a single synthesis attempt, consumed by the retry driver
#[derive(Debug)]
enum Attempt {
    /// 200 with a well-formed body; carries the generated audio URL
    Success(String),
    /// Worth another attempt if budget remains
    Retryable(SynthesisError),
    /// Retrying cannot change the outcome
    Fatal(SynthesisError),
}

/// Request body for the generate-voice endpoint
#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    script: &'a str,
    speed: &'a str,
    format: &'a str,
}

/// Client for the voice synthesis service
pub struct SynthesisClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
    speed: String,
    format: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl SynthesisClient {
    pub fn new(config: &ServerConfig) -> SynthesisResult<Self> {
        if config.voice_api_token.is_empty() {
            return Err(SynthesisError::InvalidConfiguration(
                "API token is required for the voice service".to_string(),
            ));
        }
        if config.max_retries == 0 {
            return Err(SynthesisError::InvalidConfiguration(
                "retry budget must allow at least one attempt".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SynthesisError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.voice_api_base_url.trim_end_matches('/').to_string(),
            api_token: config.voice_api_token.clone(),
            speed: config.voice_speed.clone(),
            format: config.voice_format.clone(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// Synthesize `text` with the given voice actor, returning the URL of the
    /// generated audio resource.
    ///
    /// Up to `max_retries` attempts are made in total. An authentication
    /// failure or a malformed 200 body fails immediately; any other non-200
    /// status or transport error is retried after `retry_delay`, and the last
    /// observed error surfaces once the budget is exhausted.
    pub async fn synthesize(&self, text: &str, voice_actor_id: &str) -> SynthesisResult<String> {
        let url = format!("{}/voice-actors/{voice_actor_id}/generate-voice", self.base_url);
        let request = SynthesisRequest {
            script: text,
            speed: &self.speed,
            format: &self.format,
        };

        let mut last_error = SynthesisError::Network("no synthesis attempts were made".to_string());

        for attempt in 1..=self.max_retries {
            // The request body carries no secrets; the x-api-key header is
            // deliberately left out of the logs.
            debug!(
                %url,
                attempt,
                max_retries = self.max_retries,
                body = %serde_json::to_string(&request).unwrap_or_default(),
                "sending synthesis request"
            );

            match self.attempt(&url, &request).await {
                Attempt::Success(audio_url) => {
                    debug!(%audio_url, attempt, "synthesis succeeded");
                    return Ok(audio_url);
                }
                Attempt::Fatal(e) => {
                    error!("Synthesis failed on attempt {}, not retrying: {}", attempt, e);
                    return Err(e);
                }
                Attempt::Retryable(e) => {
                    warn!(
                        "Synthesis attempt {}/{} failed: {}",
                        attempt, self.max_retries, e
                    );
                    last_error = e;
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        error!("Synthesis retries exhausted: {}", last_error);
        Err(last_error)
    }

    /// Issue one synthesis call and classify the outcome.
    async fn attempt(&self, url: &str, request: &SynthesisRequest<'_>) -> Attempt {
        let response = match self
            .http
            .post(url)
            .header("x-api-key", &self.api_token)
            .header(header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Retryable(SynthesisError::Network(e.to_string())),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Attempt::Fatal(SynthesisError::Auth);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Retryable(SynthesisError::Network(e.to_string())),
        };
        debug!(status = %status, body = %cap_error_body(&body), "synthesis API response");

        if !status.is_success() {
            return Attempt::Retryable(SynthesisError::Api {
                status,
                body: cap_error_body(&body),
            });
        }

        // 200: extract generatedVoice.url. A success status with a body we
        // cannot use is not retried; the next attempt would get the same.
        let parsed: serde_json::Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => return Attempt::Fatal(SynthesisError::MalformedResponse(e.to_string())),
        };
        match parsed.pointer("/generatedVoice/url").and_then(|v| v.as_str()) {
            Some(audio_url) => Attempt::Success(audio_url.to_string()),
            None => Attempt::Fatal(SynthesisError::MalformedResponse(
                "missing generatedVoice.url".to_string(),
            )),
        }
    }
}
