//! Tool-calling travel assistant.
//!
//! The model is offered every tool on each turn. Requested tools are executed
//! and their results fed back until the model answers in plain text or the
//! iteration cap is reached.

use super::{ConversationState, Request};
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{ChatMessage, LanguageModel, ToolInvocation, ToolSpec};
use crate::tools::{parse_tool_call, tool_definitions, Toolbox};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Answer used when neither the model nor any tool produced text.
pub const FALLBACK_ANSWER: &str = "I couldn't process your request.";

/// Steps of the assistant loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Ask the model for the next move.
    Llm,
    /// Execute the tool calls from the last model turn.
    Tools,
    /// Pick the final answer from the transcript.
    Finalize,
    End,
}

/// Agent that answers travel questions with the toolbox.
pub struct TravelAssistant {
    llm: Arc<dyn LanguageModel>,
    toolbox: Arc<Toolbox>,
    prompts: Arc<Prompts>,
    tools: Vec<ToolSpec>,
    max_iterations: usize,
}

impl TravelAssistant {
    pub fn new(llm: Arc<dyn LanguageModel>, toolbox: Arc<Toolbox>, prompts: Arc<Prompts>) -> Self {
        Self {
            llm,
            toolbox,
            prompts,
            tools: tool_definitions(),
            max_iterations: 5,
        }
    }

    /// Set the maximum number of model turns per request.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    fn opening_prompt(&self, state: &ConversationState) -> String {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), state.question.clone());
        vars.insert(
            "city".to_string(),
            state.city().unwrap_or("not provided").to_string(),
        );
        self.prompts
            .render_with_custom(&self.prompts.assistant.user, &vars)
    }

    /// Run the assistant on a request. Model errors propagate; tool errors do not.
    #[instrument(skip(self, request), fields(question = %request.question))]
    pub async fn run(&self, request: Request) -> Result<AssistantRun> {
        let mut state = ConversationState::new(request);
        let prompt = self.opening_prompt(&state);
        state.messages.push(ChatMessage::user(prompt));

        let mut iterations = 0;
        let mut pending: Vec<ToolInvocation> = Vec::new();
        let mut tool_calls = Vec::new();
        let mut step = Step::Llm;

        loop {
            step = match step {
                Step::Llm => {
                    if iterations >= self.max_iterations {
                        warn!("Reached {} model turns, finalizing", self.max_iterations);
                        Step::Finalize
                    } else {
                        iterations += 1;
                        debug!("Assistant iteration {}", iterations);

                        let completion = self.llm.chat(&state.messages, &self.tools).await?;
                        pending = completion.tool_calls.clone();
                        state.messages.push(ChatMessage::Assistant {
                            content: completion.content,
                            tool_calls: completion.tool_calls,
                        });

                        if pending.is_empty() {
                            Step::Finalize
                        } else {
                            Step::Tools
                        }
                    }
                }
                Step::Tools => {
                    for invocation in pending.drain(..) {
                        let record = self.execute(&invocation).await;
                        state.messages.push(ChatMessage::Tool {
                            call_id: invocation.id,
                            name: record.name.clone(),
                            content: record.result.clone(),
                        });
                        tool_calls.push(record);
                    }
                    Step::Llm
                }
                Step::Finalize => {
                    state.answer = Some(final_answer(&state.messages));
                    Step::End
                }
                Step::End => break,
            };
        }

        let tool_used = first_tool_used(&state.messages);
        Ok(AssistantRun {
            answer: state.answer.clone().unwrap_or_else(|| FALLBACK_ANSWER.to_string()),
            tool_used,
            tool_calls,
            iterations,
            state,
        })
    }

    async fn execute(&self, invocation: &ToolInvocation) -> ToolCallRecord {
        info!(
            "Assistant calling tool: {} with args: {}",
            invocation.name, invocation.arguments
        );

        let result = match parse_tool_call(&invocation.name, &invocation.arguments) {
            Ok(call) => self.toolbox.execute(&call).await,
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: invocation.name.clone(),
            arguments: invocation.arguments.clone(),
            result,
        }
    }
}

/// Last non-empty assistant text, else the last tool result, else the fallback.
fn final_answer(messages: &[ChatMessage]) -> String {
    let assistant_text = messages.iter().rev().find_map(|m| match m {
        ChatMessage::Assistant {
            content: Some(content),
            ..
        } if !content.trim().is_empty() => Some(content.clone()),
        _ => None,
    });

    let tool_result = || {
        messages.iter().rev().find_map(|m| match m {
            ChatMessage::Tool { content, .. } => Some(content.clone()),
            _ => None,
        })
    };

    assistant_text
        .or_else(tool_result)
        .unwrap_or_else(|| FALLBACK_ANSWER.to_string())
}

fn first_tool_used(messages: &[ChatMessage]) -> Option<String> {
    messages.iter().find_map(|m| match m {
        ChatMessage::Tool { name, .. } => Some(name.clone()),
        _ => None,
    })
}

/// Result of an assistant run.
#[derive(Debug)]
pub struct AssistantRun {
    pub answer: String,
    /// Name of the first tool invoked, if any.
    pub tool_used: Option<String>,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model turns used.
    pub iterations: usize,
    pub state: ConversationState,
}

/// Record of a tool call made by the assistant.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedModel;
    use crate::llm::Completion;
    use crate::tools::fakes::{toolbox, FixedSearch, FixedWeather};
    use crate::tools::{SearchHit, DEFINITION_NOT_FOUND, WEATHER_UNAVAILABLE};

    fn tool_turn(name: &str, arguments: &str) -> Completion {
        Completion {
            content: None,
            tool_calls: vec![ToolInvocation {
                id: format!("call_{}", name),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        }
    }

    fn assistant(
        model: ScriptedModel,
        weather: FixedWeather,
    ) -> (TravelAssistant, Arc<ScriptedModel>) {
        let model = Arc::new(model);
        let hits = vec![SearchHit {
            title: "Louvre".to_string(),
            body: "Closed on Tuesdays".to_string(),
            url: None,
        }];
        let assistant = TravelAssistant::new(
            model.clone(),
            Arc::new(toolbox(weather, FixedSearch(Some(hits)))),
            Arc::new(Prompts::default()),
        );
        (assistant, model)
    }

    #[tokio::test]
    async fn test_direct_answer_without_tools() {
        let (assistant, model) = assistant(
            ScriptedModel::texts(&["Hello, traveller!"]),
            FixedWeather::sunny(),
        );
        let run = assistant.run(Request::new("Hi")).await.unwrap();

        assert_eq!(run.answer, "Hello, traveller!");
        assert_eq!(run.tool_used, None);
        assert_eq!(run.iterations, 1);
        assert!(model.user_prompt(0).contains("City (if provided): not provided"));
    }

    #[tokio::test]
    async fn test_weather_tool_then_answer() {
        let (assistant, model) = assistant(
            ScriptedModel::new(vec![
                tool_turn("get_weather", r#"{"city": "Paris"}"#),
                Completion::text("It's sunny and 25°C in Paris."),
            ]),
            FixedWeather::sunny(),
        );

        let run = assistant
            .run(Request::new("What's the weather?").with_city("Paris"))
            .await
            .unwrap();

        assert_eq!(run.answer, "It's sunny and 25°C in Paris.");
        assert_eq!(run.tool_used.as_deref(), Some("get_weather"));
        assert_eq!(run.tool_calls.len(), 1);
        assert!(run.tool_calls[0].result.starts_with("Weather in Paris:"));
        assert_eq!(run.iterations, 2);

        let seen = model.seen.lock().unwrap();
        let second_turn = &seen[1];
        assert!(matches!(
            second_turn.last(),
            Some(ChatMessage::Tool { call_id, .. }) if call_id == "call_get_weather"
        ));
    }

    #[tokio::test]
    async fn test_tool_result_is_answer_when_model_goes_silent() {
        let (assistant, _) = assistant(
            ScriptedModel::new(vec![
                tool_turn("define_word", r#"{"word": "zeppelin"}"#),
                Completion::default(),
            ]),
            FixedWeather::sunny(),
        );

        let run = assistant.run(Request::new("Define zeppelin")).await.unwrap();
        assert_eq!(run.answer, DEFINITION_NOT_FOUND);
        assert_eq!(run.tool_used.as_deref(), Some("define_word"));
    }

    #[tokio::test]
    async fn test_loop_is_bounded() {
        let (assistant, model) = assistant(
            ScriptedModel::repeating(tool_turn("web_search", r#"{"query": "louvre hours"}"#)),
            FixedWeather::sunny(),
        );
        let assistant = assistant.with_max_iterations(3);

        let run = assistant.run(Request::new("When is the Louvre open?")).await.unwrap();

        assert_eq!(model.calls(), 3);
        assert_eq!(run.iterations, 3);
        assert_eq!(run.tool_calls.len(), 3);
        assert_eq!(run.answer, "- Louvre: Closed on Tuesdays");
    }

    #[tokio::test]
    async fn test_weather_failure_is_reported_to_model() {
        let (assistant, _) = assistant(
            ScriptedModel::new(vec![
                tool_turn("get_weather", r#"{"city": "Atlantis"}"#),
                Completion::default(),
            ]),
            FixedWeather::broken(),
        );

        let run = assistant.run(Request::new("Weather in Atlantis?")).await.unwrap();
        assert_eq!(run.answer, WEATHER_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_bad_tool_arguments_do_not_abort() {
        let (assistant, _) = assistant(
            ScriptedModel::new(vec![
                tool_turn("teleport", "{}"),
                Completion::text("Sorry, I can't do that."),
            ]),
            FixedWeather::sunny(),
        );

        let run = assistant.run(Request::new("Beam me to Rome")).await.unwrap();
        assert_eq!(run.answer, "Sorry, I can't do that.");
        assert!(run.tool_calls[0].result.starts_with("Failed to parse tool call"));
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let (assistant, _) = assistant(
            ScriptedModel::failing("quota exceeded"),
            FixedWeather::sunny(),
        );
        assert!(assistant.run(Request::new("Hi")).await.is_err());
    }

    #[test]
    fn test_final_answer_fallback() {
        assert_eq!(final_answer(&[ChatMessage::user("hi")]), FALLBACK_ANSWER);
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "web_search".to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
            result: "Found results".to_string(),
        };
        assert_eq!(format!("{}", record), r#"web_search({"query": "test"})"#);
    }
}
