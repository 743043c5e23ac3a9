//! Error types for Waypoint.

use thiserror::Error;

/// Library-level error type for Waypoint operations.
#[derive(Error, Debug)]
pub enum WaypointError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Weather lookup failed: {0}")]
    Weather(String),

    #[error("Web search failed: {0}")]
    Search(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Document ingestion failed: {0}")]
    Ingest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for Waypoint operations.
pub type Result<T> = std::result::Result<T, WaypointError>;
