//! Chat model abstraction used by the router, handlers and assistant.
//!
//! Messages and tool calls are kept in crate-owned types so graph code never
//! depends on a particular provider's request format.

mod openai;

pub use openai::OpenAIChat;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Provider-assigned call ID, echoed back in the tool result.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// A message in a conversation with the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolInvocation>,
    },
    Tool {
        call_id: String,
        name: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// JSON-schema description of a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// One model turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

impl Completion {
    /// A plain text completion with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// Trait for chat completion backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one chat turn, offering the given tools.
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<Completion>;

    /// Complete a single prompt and return the text.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let completion = self.chat(&[ChatMessage::user(prompt)], &[]).await?;
        Ok(completion.content.unwrap_or_default())
    }
}
