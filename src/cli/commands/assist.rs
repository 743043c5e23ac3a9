//! Assist command: run the tool-calling assistant.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::graph::Request;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the assist command.
pub async fn run_assist(
    question: &str,
    city: Option<String>,
    show_tools: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Answer, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'waypoint doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let assistant = orchestrator.assistant();

    let mut request = Request::new(question);
    request.city = city;

    let spinner = Output::spinner("Working...");
    let result = assistant.run(request).await;
    spinner.finish_and_clear();

    match result {
        Ok(run) => {
            if show_tools && !run.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({} turns)", run.iterations));
                for call in &run.tool_calls {
                    Output::tool_call(&call.to_string(), &call.result);
                }
            }
            Output::answer(&run.answer);
        }
        Err(e) => {
            Output::error(&format!("Assistant failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
