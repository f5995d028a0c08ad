use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::core::{CompletionClient, SessionRegistry, SynthesisClient};

/// Application state that can be shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    /// Client for the chat completion service
    pub completion: CompletionClient,
    /// Client for the voice synthesis service
    pub synthesis: SynthesisClient,
    /// Registry of open WebSocket connections and their transcripts
    pub sessions: SessionRegistry,
    /// HTTP client for the audio relay; connect timeout only, since a
    /// streamed body can legitimately outlive any fixed total deadline
    pub relay: reqwest::Client,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let completion = CompletionClient::new(&config)?;
        let synthesis = SynthesisClient::new(&config)?;
        let relay = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Arc::new(Self {
            config,
            completion,
            synthesis,
            sessions: SessionRegistry::new(),
            relay,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            openai_api_key: "sk-test".to_string(),
            openai_base_url: "https://api.invalid/v1".to_string(),
            gpt_model: "gpt-4o-mini".to_string(),
            max_tokens: 150,
            temperature: 0.7,
            voice_api_token: "voice-test".to_string(),
            voice_api_base_url: "https://voice.invalid/v1".to_string(),
            default_voice_actor_id: "1".to_string(),
            voice_speed: "1".to_string(),
            voice_format: "mp3".to_string(),
            max_retries: 3,
            retry_delay: Duration::from_millis(10),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_new_builds_state() {
        let state = AppState::new(test_config()).unwrap();
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        let mut config = test_config();
        config.openai_api_key = String::new();
        assert!(AppState::new(config).is_err());
    }
}
