//! Configuration settings for Waypoint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub weather: WeatherSettings,
    pub search: SearchSettings,
    pub dictionary: DictionarySettings,
    pub documents: DocumentSettings,
    pub vector_store: VectorStoreSettings,
    pub rag: RagSettings,
    pub agent: AgentSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.waypoint".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Chat model settings shared by the router, handlers and assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat completion model.
    pub model: String,
    /// Model used for intent classification.
    pub router_model: Option<String>,
    /// Sampling temperature for answer generation.
    pub temperature: f32,
    /// API key (falls back to OPENAI_API_KEY).
    pub api_key: Option<String>,
    /// Alternative OpenAI-compatible base URL.
    pub api_base: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            router_model: None,
            temperature: 0.0,
            api_key: None,
            api_base: None,
            timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    /// Model used by the router, defaulting to the main chat model.
    pub fn router_model(&self) -> &str {
        self.router_model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.model)
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Weather provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherProviderKind {
    /// OpenWeatherMap current weather API.
    #[default]
    OpenWeatherMap,
    /// Randomized readings, no network access.
    Simulated,
}

impl std::str::FromStr for WeatherProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openweathermap" | "owm" => Ok(WeatherProviderKind::OpenWeatherMap),
            "simulated" | "random" => Ok(WeatherProviderKind::Simulated),
            _ => Err(format!("Unknown weather provider: {}", s)),
        }
    }
}

impl std::fmt::Display for WeatherProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherProviderKind::OpenWeatherMap => write!(f, "openweathermap"),
            WeatherProviderKind::Simulated => write!(f, "simulated"),
        }
    }
}

/// Measurement system for weather readings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherUnits {
    #[default]
    Metric,
    Imperial,
}

impl WeatherUnits {
    /// Query value understood by OpenWeatherMap.
    pub fn as_query(&self) -> &'static str {
        match self {
            WeatherUnits::Metric => "metric",
            WeatherUnits::Imperial => "imperial",
        }
    }

    /// Temperature suffix for display.
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            WeatherUnits::Metric => "°C",
            WeatherUnits::Imperial => "°F",
        }
    }
}

/// Weather tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub provider: WeatherProviderKind,
    /// API endpoint for current conditions.
    pub endpoint: String,
    /// API key (falls back to OPENWEATHER_API_KEY).
    pub api_key: Option<String>,
    pub units: WeatherUnits,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            provider: WeatherProviderKind::OpenWeatherMap,
            endpoint: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            api_key: None,
            units: WeatherUnits::Metric,
            timeout_secs: 10,
        }
    }
}

impl WeatherSettings {
    /// Resolve the API key from settings or the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OPENWEATHER_API_KEY").ok().filter(|k| !k.is_empty()))
    }
}

/// Web search tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// DuckDuckGo Instant Answer endpoint.
    pub endpoint: String,
    /// Maximum number of hits returned to the caller.
    pub max_results: usize,
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.duckduckgo.com/".to_string(),
            max_results: 3,
            timeout_secs: 10,
        }
    }
}

/// Extra dictionary entries merged over the built-in travel terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct DictionarySettings {
    pub entries: HashMap<String, String>,
}

/// Document corpus settings for retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Directory containing .txt and .md documents.
    pub dir: String,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            dir: "~/.waypoint/docs".to_string(),
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.waypoint/index.db".to_string(),
        }
    }
}

/// Retrieval-augmented answering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Number of passages handed to the model.
    pub top_k: usize,
    /// Minimum similarity score for a passage.
    pub min_score: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_score: 0.0,
        }
    }
}

/// Tool-calling assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum LLM turns per request.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { max_iterations: 5 }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 120,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else if path.is_some() {
            Err(crate::error::WaypointError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )))
        } else {
            Ok(Settings::default())
        }
    }

    /// Parse settings from a TOML document.
    pub fn from_toml(content: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::WaypointError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("waypoint")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded document directory path.
    pub fn documents_dir(&self) -> PathBuf {
        Self::expand_path(&self.documents.dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.rag.top_k, 3);
        assert_eq!(settings.documents.chunk_size, 500);
        assert_eq!(settings.documents.chunk_overlap, 50);
        assert_eq!(settings.search.max_results, 3);
        assert!(settings.agent.max_iterations > 0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(
            r#"
            [weather]
            provider = "simulated"
            units = "imperial"

            [llm]
            router_model = "gpt-4.1-nano"

            [dictionary.entries]
            hostel = "Budget lodging with shared rooms."
            "#,
        )
        .unwrap();

        assert_eq!(settings.weather.provider, WeatherProviderKind::Simulated);
        assert_eq!(settings.weather.units.temperature_symbol(), "°F");
        assert_eq!(settings.llm.router_model(), "gpt-4.1-nano");
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.dictionary.entries.len(), 1);
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_router_model_falls_back_to_chat_model() {
        let mut llm = LlmSettings::default();
        llm.router_model = Some(String::new());
        assert_eq!(llm.router_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.agent.max_iterations = 9;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.agent.max_iterations, 9);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Settings::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!(
            "OWM".parse::<WeatherProviderKind>().unwrap(),
            WeatherProviderKind::OpenWeatherMap
        );
        assert!("sundial".parse::<WeatherProviderKind>().is_err());
    }
}
