//! Request and conversation state threaded through the graphs.

use crate::llm::ChatMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An incoming question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub question: String,
    #[serde(default)]
    pub city: Option<String>,
}

impl Request {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            city: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }
}

/// The handler a question is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Live weather lookup.
    Weather,
    /// Answer from the document index.
    Rag,
}

impl Intent {
    /// Map a classifier reply onto an intent. Unrecognized labels fall back to `Rag`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.starts_with("weather") {
            Intent::Weather
        } else {
            Intent::Rag
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Weather => "weather",
            Intent::Rag => "rag",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable per-request state. Created from a [`Request`], dropped after the response.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationState {
    pub question: String,
    pub city: Option<String>,
    pub route: Option<Intent>,
    pub messages: Vec<ChatMessage>,
    pub answer: Option<String>,
}

impl ConversationState {
    pub fn new(request: Request) -> Self {
        Self {
            question: request.question,
            city: request.city,
            route: None,
            messages: Vec::new(),
            answer: None,
        }
    }

    /// City with surrounding whitespace removed, if any is left.
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}
