//! Waypoint - an agentic travel assistant
//!
//! Routes natural-language travel questions to the capability that can answer
//! them: live weather, retrieval over your own travel documents, a phrase
//! dictionary, or web search.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` - Chat model abstraction and the OpenAI backend
//! - `tools` - Weather, dictionary and web search adapters
//! - `embedding` - Embedding generation
//! - `vector_store` - Document index storage
//! - `ingest` - Document loading, splitting and indexing
//! - `retrieval` - Top-k passage retrieval
//! - `graph` - Routing graph and tool-calling assistant
//! - `orchestrator` - Component wiring
//! - `eval` - Assistant smoke evaluation
//!
//! # Example
//!
//! ```rust,no_run
//! use waypoint::config::Settings;
//! use waypoint::graph::Request;
//! use waypoint::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let request = Request::new("What's the weather like?").with_city("Lisbon");
//!     let answer = orchestrator.routing_graph().answer(request).await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod eval;
pub mod graph;
pub mod ingest;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod retrieval;
pub mod tools;
pub mod vector_store;

pub use error::{Result, WaypointError};
