use std::env;
use std::time::Duration;

use super::ServerConfig;
use super::utils::parse_env;
use super::validation::{require_var, validate_retry_policy, validate_temperature};

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads configuration from environment variables, with sensible defaults.
    /// Also loads from a `.env` file if present using dotenvy.
    ///
    /// # Returns
    /// * `Result<Self, Box<dyn std::error::Error>>` - The loaded configuration or an error
    ///
    /// # Errors
    /// Returns an error if:
    /// - `OPENAI_API_KEY`, `VOICE_API_TOKEN` or `VOICE_API_BASE_URL` is missing
    /// - A numeric variable is set but malformed
    /// - The retry or sampling policy is out of range
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        // Server configuration
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_env("PORT", 8000u16)?;

        // Completion service configuration
        let openai_api_key = require_var("OPENAI_API_KEY")?;
        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let gpt_model = env::var("GPT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let max_tokens = parse_env("MAX_TOKENS", 150u32)?;
        let temperature = parse_env("TEMPERATURE", 0.7f32)?;

        // Voice synthesis service configuration
        let voice_api_token = require_var("VOICE_API_TOKEN")?;
        let voice_api_base_url = require_var("VOICE_API_BASE_URL")?;
        let default_voice_actor_id =
            env::var("DEFAULT_VOICE_ACTOR_ID").unwrap_or_else(|_| "1".to_string());
        let voice_speed = env::var("VOICE_SPEED").unwrap_or_else(|_| "1".to_string());
        let voice_format = env::var("VOICE_FORMAT").unwrap_or_else(|_| "mp3".to_string());

        // Outbound call policy
        let max_retries = parse_env("MAX_RETRIES", 3u32)?;
        let retry_delay = Duration::from_millis(parse_env("RETRY_DELAY_MS", 1000u64)?);
        let request_timeout = Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECONDS", 30u64)?);

        validate_retry_policy(max_retries)?;
        validate_temperature(temperature)?;

        Ok(ServerConfig {
            host,
            port,
            openai_api_key,
            openai_base_url,
            gpt_model,
            max_tokens,
            temperature,
            voice_api_token,
            voice_api_base_url,
            default_voice_actor_id,
            voice_speed,
            voice_format,
            max_retries,
            retry_delay,
            request_timeout,
        })
    }
}
