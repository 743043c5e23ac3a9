//! Eval command: run the built-in assistant suite.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::eval::{run_suite, DEFAULT_CASES};
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the evaluation suite and print a summary.
pub async fn run_eval(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Answer, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let assistant = orchestrator.assistant();

    Output::header("Running assistant evaluation");
    println!();

    let spinner = Output::spinner(&format!("Running {} cases...", DEFAULT_CASES.len()));
    let summary = run_suite(&assistant, &DEFAULT_CASES).await;
    spinner.finish_and_clear();

    for outcome in &summary.outcomes {
        Output::eval_case(
            outcome.passed(),
            outcome.case.question,
            outcome.tool_used.as_deref(),
            outcome.latency.as_millis(),
        );
        match &outcome.answer {
            Ok(_) if !outcome.passed() => {
                Output::kv("expected", outcome.case.expected_tool);
            }
            Err(e) => Output::kv("error", e),
            Ok(_) => {}
        }
    }

    Output::header("Summary");
    Output::kv("Cases", &summary.total().to_string());
    Output::kv("Passed", &summary.passed().to_string());
    Output::kv("Failures", &summary.failures().to_string());
    Output::kv(
        "Average latency",
        &format!("{:.2}s", summary.average_latency().as_secs_f64()),
    );

    println!("\nTool usage:");
    for (tool, count) in summary.tool_usage() {
        Output::list_item(&format!("{}: {}", tool, count));
    }
    println!();

    if summary.passed() == summary.total() {
        Output::success("All cases passed.");
    } else {
        Output::warning(&format!(
            "{} of {} cases did not use the expected tool.",
            summary.total() - summary.passed(),
            summary.total()
        ));
    }

    Ok(())
}
