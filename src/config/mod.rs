//! Configuration module for Waypoint.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts, RagPrompts, RouterPrompts};
pub use settings::{
    AgentSettings, DictionarySettings, DocumentSettings, EmbeddingSettings, GeneralSettings,
    LlmSettings, PromptSettings, RagSettings, SearchSettings, ServerSettings, Settings,
    VectorStoreSettings, WeatherProviderKind, WeatherSettings, WeatherUnits,
};
