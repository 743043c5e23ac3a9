//! OpenAI client configuration.

use crate::config::LlmSettings;
use crate::error::{Result, WaypointError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client from the LLM settings.
///
/// The API key falls back to `OPENAI_API_KEY` when the settings leave it unset.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let mut config = OpenAIConfig::new();
    if let Some(key) = settings.api_key.as_deref().filter(|k| !k.is_empty()) {
        config = config.with_api_key(key);
    }
    if let Some(base) = settings.api_base.as_deref().filter(|b| !b.is_empty()) {
        config = config.with_api_base(base);
    }

    create_client_with_timeout(config, Duration::from_secs(settings.timeout_secs))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    config: OpenAIConfig,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| WaypointError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
