//! Tool adapters and the toolbox the assistant calls into.
//!
//! Every tool answers with a plain string. Upstream failures are logged and
//! replaced with fixed user-facing messages so a broken API never aborts a
//! request.

mod dictionary;
mod search;
mod weather;

pub use dictionary::{Dictionary, DEFINITION_NOT_FOUND};
pub use search::{
    format_hits, search_or_sentinel, DuckDuckGo, SearchHit, WebSearch, NO_RESULTS,
};
pub use weather::{OpenWeatherMap, SimulatedWeather, WeatherReport, WeatherSource};

use crate::error::{Result, WaypointError};
use crate::llm::ToolSpec;
use std::sync::Arc;
use tracing::{info, warn};

/// Returned when weather data cannot be fetched.
pub const WEATHER_UNAVAILABLE: &str = "Unable to retrieve weather data.";

/// A parsed tool request.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    /// Current conditions for a city.
    GetWeather { city: String },
    /// Definition of a travel term.
    DefineWord { word: String },
    /// Web search.
    WebSearch { query: String },
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::GetWeather { .. } => "get_weather",
            ToolCall::DefineWord { .. } => "define_word",
            ToolCall::WebSearch { .. } => "web_search",
        }
    }
}

/// Names of every tool the assistant can call.
pub const TOOL_NAMES: [&str; 3] = ["get_weather", "define_word", "web_search"];

/// Get function/tool definitions for the model.
pub fn tool_definitions() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "get_weather".to_string(),
            description: "Get current weather conditions for a city.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name, e.g. 'Paris'"
                    }
                },
                "required": ["city"]
            }),
        },
        ToolSpec {
            name: "define_word".to_string(),
            description: "Look up the meaning of a word.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "word": {
                        "type": "string",
                        "description": "The word to define"
                    }
                },
                "required": ["word"]
            }),
        },
        ToolSpec {
            name: "web_search".to_string(),
            description: "Search the web for travel-related information.".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        },
    ]
}

/// Parse a tool call from the model's name and JSON arguments.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| WaypointError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let string_arg = |key: &str| -> Result<String> {
        args[key]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WaypointError::Agent(format!("Missing '{}' argument", key)))
    };

    match name {
        "get_weather" => Ok(ToolCall::GetWeather {
            city: string_arg("city")?,
        }),
        "define_word" => Ok(ToolCall::DefineWord {
            word: string_arg("word")?,
        }),
        "web_search" => Ok(ToolCall::WebSearch {
            query: string_arg("query")?,
        }),
        _ => Err(WaypointError::Agent(format!("Unknown tool: {}", name))),
    }
}

/// The set of tool adapters available to a process.
pub struct Toolbox {
    weather: Arc<dyn WeatherSource>,
    dictionary: Dictionary,
    search: Arc<dyn WebSearch>,
    max_search_results: usize,
}

impl Toolbox {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        dictionary: Dictionary,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            weather,
            dictionary,
            search,
            max_search_results: 3,
        }
    }

    /// Set the maximum number of search hits returned to the model.
    pub fn with_max_search_results(mut self, max: usize) -> Self {
        self.max_search_results = max;
        self
    }

    pub fn weather_source(&self) -> Arc<dyn WeatherSource> {
        self.weather.clone()
    }

    /// Fetch weather and format it, masking failures.
    pub async fn weather(&self, city: &str) -> String {
        match self.weather.get_weather(city).await {
            Ok(report) => report.summary(self.weather.units()),
            Err(e) => {
                warn!("Weather lookup for '{}' failed: {}", city, e);
                WEATHER_UNAVAILABLE.to_string()
            }
        }
    }

    /// Look up a word in the dictionary.
    pub fn define(&self, word: &str) -> String {
        self.dictionary.lookup(word)
    }

    /// Search the web, masking failures behind the empty-result sentinel.
    pub async fn search(&self, query: &str) -> String {
        search_or_sentinel(self.search.as_ref(), query, self.max_search_results).await
    }

    /// Execute a tool call and return its output.
    pub async fn execute(&self, call: &ToolCall) -> String {
        info!("Executing tool {}", call.name());
        match call {
            ToolCall::GetWeather { city } => self.weather(city).await,
            ToolCall::DefineWord { word } => self.define(word),
            ToolCall::WebSearch { query } => self.search(query).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! In-process adapters for tests.

    use super::*;
    use async_trait::async_trait;

    /// Weather source with a fixed report, or a fixed failure.
    pub struct FixedWeather(pub Option<WeatherReport>);

    impl FixedWeather {
        pub fn sunny() -> Self {
            Self(Some(WeatherReport {
                city: String::new(),
                temperature: 25.0,
                condition: "sunny".to_string(),
                humidity: 50,
            }))
        }

        pub fn broken() -> Self {
            Self(None)
        }
    }

    #[async_trait]
    impl WeatherSource for FixedWeather {
        async fn get_weather(&self, city: &str) -> Result<WeatherReport> {
            match &self.0 {
                Some(report) if !city.trim().is_empty() => Ok(WeatherReport {
                    city: city.to_string(),
                    ..report.clone()
                }),
                Some(_) => Err(WaypointError::InvalidInput("City cannot be empty".to_string())),
                None => Err(WaypointError::Weather("city not found".to_string())),
            }
        }
    }

    /// Search backend with fixed hits, or a fixed failure.
    pub struct FixedSearch(pub Option<Vec<SearchHit>>);

    #[async_trait]
    impl WebSearch for FixedSearch {
        async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SearchHit>> {
            match &self.0 {
                Some(hits) => Ok(hits.iter().take(limit).cloned().collect()),
                None => Err(WaypointError::Search("connection refused".to_string())),
            }
        }
    }

    pub fn toolbox(weather: FixedWeather, search: FixedSearch) -> Toolbox {
        Toolbox::new(Arc::new(weather), Dictionary::new(), Arc::new(search))
    }
}
