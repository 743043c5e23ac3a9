//! OpenAI chat completions backend.

use super::{ChatMessage, Completion, LanguageModel, ToolInvocation, ToolSpec};
use crate::config::LlmSettings;
use crate::error::{Result, WaypointError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model backed by the OpenAI API (or any compatible endpoint).
pub struct OpenAIChat {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChat {
    /// Create a chat model from settings.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    /// Use a different model name with the same client settings.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        ChatMessage::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(|e| WaypointError::Llm(e.to_string()))?
            .into(),
        ChatMessage::User { content } => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(|e| WaypointError::Llm(e.to_string()))?
            .into(),
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = content {
                args.content(text.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build()
                .map_err(|e| WaypointError::Llm(e.to_string()))?
                .into()
        }
        ChatMessage::Tool {
            call_id, content, ..
        } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()
            .map_err(|e| WaypointError::Llm(e.to_string()))?
            .into(),
    };
    Ok(built)
}

fn to_tool(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.clone(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters.clone()),
            strict: None,
        },
    }
}

#[async_trait]
impl LanguageModel for OpenAIChat {
    #[instrument(
        skip(self, messages, tools),
        fields(model = %self.model, messages = messages.len())
    )]
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<Completion> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(request_messages)
            .temperature(self.temperature);
        if !tools.is_empty() {
            builder.tools(tools.iter().map(to_tool).collect::<Vec<_>>());
        }
        let request = builder
            .build()
            .map_err(|e| WaypointError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| WaypointError::OpenAI(format!("Chat completion failed: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| WaypointError::Llm("No response from model".to_string()))?;

        let tool_calls: Vec<ToolInvocation> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        debug!("Model replied with {} tool call(s)", tool_calls.len());

        Ok(Completion {
            content: choice.message.content,
            tool_calls,
        })
    }
}
