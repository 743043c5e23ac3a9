//! Pre-flight checks before commands that call external APIs.
//!
//! Validates that required credentials are available before starting
//! operations that would otherwise fail midway.

use crate::config::{Settings, WeatherProviderKind};
use crate::error::{Result, WaypointError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Routing, RAG and the assistant need the LLM and weather credentials.
    Answer,
    /// Indexing needs the embeddings API.
    Ingest,
    /// Direct weather lookups need only the weather provider.
    Weather,
    /// Dictionary and web search need nothing.
    Offline,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Answer => {
            check_openai_key(settings)?;
            check_weather_key(settings)?;
        }
        Operation::Ingest => check_openai_key(settings)?,
        Operation::Weather => check_weather_key(settings)?,
        Operation::Offline => {}
    }
    Ok(())
}

/// Check if an OpenAI API key is configured. A custom `api_base` may not need one.
pub fn check_openai_key(settings: &Settings) -> Result<()> {
    if settings.llm.api_base.as_deref().is_some_and(|b| !b.is_empty()) {
        return Ok(());
    }
    if settings.llm.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
        return Ok(());
    }
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(WaypointError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(WaypointError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check the weather provider has what it needs.
pub fn check_weather_key(settings: &Settings) -> Result<()> {
    match settings.weather.provider {
        WeatherProviderKind::Simulated => Ok(()),
        WeatherProviderKind::OpenWeatherMap => settings
            .weather
            .resolved_api_key()
            .map(|_| ())
            .ok_or_else(|| {
                WaypointError::Config(
                    "OPENWEATHER_API_KEY not set. Export it, set weather.api_key, \
                     or use weather.provider = \"simulated\""
                        .to_string(),
                )
            }),
    }
}
