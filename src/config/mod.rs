//! Configuration module for the kaiwa server
//!
//! Configuration comes from environment variables (with `.env` support for
//! local development). Required values are validated at startup so the
//! process fails fast instead of limping along with a broken upstream setup.
//!
//! # Modules
//! - `env`: Environment variable loading
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use kaiwa::config::ServerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

mod env;
mod utils;
mod validation;

/// Server configuration
///
/// Contains all configuration needed to run the kaiwa server, including:
/// - Server settings (host, port)
/// - Completion service settings (API key, model, sampling parameters)
/// - Voice synthesis service settings (token, base URL, voice defaults)
/// - Retry and timeout policy for outbound calls
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Completion service settings
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub gpt_model: String,
    pub max_tokens: u32,
    pub temperature: f32,

    // Voice synthesis service settings
    pub voice_api_token: String,
    pub voice_api_base_url: String,
    pub default_voice_actor_id: String,
    pub voice_speed: String,
    pub voice_format: String,

    // Outbound call policy
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port".
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
