//! Orchestration graphs.
//!
//! Each graph is a small state machine over an explicit node enum with a
//! static transition function. [`RoutingGraph`] classifies a question and
//! hands it to exactly one handler. [`TravelAssistant`] lets the model pick
//! tools in a bounded loop.

mod assistant;
mod handlers;
mod router;
mod state;

pub use assistant::{AssistantRun, Step, ToolCallRecord, TravelAssistant, FALLBACK_ANSWER};
pub use handlers::{RagHandler, WeatherHandler};
pub use router::Router;
pub use state::{ConversationState, Intent, Request};

use crate::error::Result;
use crate::llm::ChatMessage;
use tracing::{debug, info, instrument};

/// Nodes of the routing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Route,
    Weather,
    Rag,
    End,
}

impl Node {
    /// Transition table: `Route` branches on the chosen intent, handlers finish.
    pub fn next(self, state: &ConversationState) -> Node {
        match self {
            Node::Route => match state.route {
                Some(Intent::Weather) => Node::Weather,
                Some(Intent::Rag) | None => Node::Rag,
            },
            Node::Weather | Node::Rag | Node::End => Node::End,
        }
    }
}

/// Router → handler → end.
pub struct RoutingGraph {
    router: Router,
    weather: WeatherHandler,
    rag: RagHandler,
}

impl RoutingGraph {
    pub fn new(router: Router, weather: WeatherHandler, rag: RagHandler) -> Self {
        Self {
            router,
            weather,
            rag,
        }
    }

    /// Run a request to completion. Only the RAG handler can fail.
    #[instrument(skip(self, request), fields(question = %request.question))]
    pub async fn run(&self, request: Request) -> Result<ConversationState> {
        let mut state = ConversationState::new(request);
        state.messages.push(ChatMessage::user(state.question.clone()));

        let mut node = Node::Route;
        loop {
            debug!("Entering {:?}", node);
            match node {
                Node::Route => {
                    let intent = self.router.route(&state.question).await;
                    info!("Routed to {}", intent);
                    state.route = Some(intent);
                }
                Node::Weather => {
                    let answer = self.weather.run(state.city()).await;
                    state.messages.push(ChatMessage::assistant(answer.clone()));
                    state.answer = Some(answer);
                }
                Node::Rag => {
                    let answer = self.rag.run(&state.question).await?;
                    state.messages.push(ChatMessage::assistant(answer.clone()));
                    state.answer = Some(answer);
                }
                Node::End => break,
            }
            node = node.next(&state);
        }

        Ok(state)
    }

    /// Run a request and return only the answer.
    pub async fn answer(&self, request: Request) -> Result<String> {
        let state = self.run(request).await?;
        Ok(state.answer.unwrap_or_default())
    }
}
