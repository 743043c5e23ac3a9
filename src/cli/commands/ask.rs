//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::graph::Request;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command through the routing graph.
pub async fn run_ask(question: &str, city: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Answer, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'waypoint doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let graph = orchestrator.routing_graph();

    let mut request = Request::new(question);
    request.city = city;

    let spinner = Output::spinner("Thinking...");

    match graph.run(request).await {
        Ok(state) => {
            spinner.finish_and_clear();
            if let Some(route) = state.route {
                Output::kv("Route", route.as_str());
            }
            Output::answer(state.answer.as_deref().unwrap_or_default());
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
