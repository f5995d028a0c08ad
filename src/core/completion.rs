//! Chat completion client
//!
//! Thin wrapper over an OpenAI-style `/chat/completions` endpoint. A fixed
//! system persona is prepended ahead of the caller-supplied history, and the
//! sampling parameters are process-wide configuration rather than per-call
//! options. Failures are not retried at this layer; the caller sees the
//! underlying error immediately.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::cap_error_body;
use crate::config::ServerConfig;
use crate::core::session::Turn;

/// System persona prepended to every completion request.
const SYSTEM_PROMPT: &str = "あなたは親切で役立つAIアシスタントです。";

/// Error types for completion API operations
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Non-success status from the completion API
    #[error("completion API error: status {status} - {body}")]
    Api { status: StatusCode, body: String },

    /// Transport-level failure (connection error, timeout, DNS failure)
    #[error("network error calling completion API: {0}")]
    Network(String),

    /// Response parsed but did not contain an assistant message
    #[error("completion API returned an unexpected response body: {0}")]
    MalformedResponse(String),

    /// Client could not be constructed from the given configuration
    #[error("invalid completion client configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for completion operations
pub type CompletionResult<T> = Result<T, CompletionError>;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the chat completion service
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionClient {
    pub fn new(config: &ServerConfig) -> CompletionResult<Self> {
        if config.openai_api_key.is_empty() {
            return Err(CompletionError::InvalidConfiguration(
                "API key is required for the completion service".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CompletionError::InvalidConfiguration(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            model: config.gpt_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Request an assistant reply for the given conversation history.
    ///
    /// The history is submitted in order, behind the fixed system persona.
    ///
    /// # Errors
    /// Any transport or API failure surfaces immediately; there is no retry
    /// at this layer.
    pub async fn complete(&self, history: &[Turn]) -> CompletionResult<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(json!({"role": "system", "content": SYSTEM_PROMPT}));
        for turn in history {
            messages.push(json!({"role": turn.role, "content": turn.content}));
        }

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "top_p": 1,
            "frequency_penalty": 0,
            "presence_penalty": 0,
        });

        debug!(%url, model = %self.model, turns = history.len(), "sending completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request failed: {}", e);
                CompletionError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            error!("Completion API error: status {} - {}", status, cap_error_body(&text));
            return Err(CompletionError::Api {
                status,
                body: cap_error_body(&text),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                CompletionError::MalformedResponse(
                    "response contained no assistant message".to_string(),
                )
            })
    }
}
