//! Smoke evaluation of the tool-calling assistant.
//!
//! Runs a fixed set of questions, checks which tool the assistant reached for
//! and records latency.

use crate::graph::{Request, TravelAssistant};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::warn;

/// A question with the tool it should trigger.
#[derive(Debug, Clone, Copy)]
pub struct EvalCase {
    pub question: &'static str,
    pub city: Option<&'static str>,
    pub expected_tool: &'static str,
}

/// Built-in evaluation suite.
pub const DEFAULT_CASES: [EvalCase; 6] = [
    EvalCase {
        question: "What is the weather in Paris?",
        city: Some("Paris"),
        expected_tool: "get_weather",
    },
    EvalCase {
        question: "Define passport",
        city: None,
        expected_tool: "define_word",
    },
    EvalCase {
        question: "Is it safe to travel to Lagos?",
        city: None,
        expected_tool: "web_search",
    },
    EvalCase {
        question: "Best travel route from Abuja to Accra",
        city: None,
        expected_tool: "web_search",
    },
    EvalCase {
        question: "Weather condition in Tokyo today",
        city: Some("Tokyo"),
        expected_tool: "get_weather",
    },
    EvalCase {
        question: "Meaning of visa",
        city: None,
        expected_tool: "define_word",
    },
];

/// Outcome of a single case.
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    pub case: EvalCase,
    pub latency: Duration,
    pub tool_used: Option<String>,
    /// Answer text, or the error when the run failed.
    pub answer: Result<String, String>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.answer.is_ok() && self.tool_used.as_deref() == Some(self.case.expected_tool)
    }
}

/// Aggregate results for a suite.
#[derive(Debug, Clone, Default)]
pub struct EvalSummary {
    pub outcomes: Vec<CaseOutcome>,
}

impl EvalSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    /// Runs that returned an error.
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.answer.is_err()).count()
    }

    /// Mean latency over successful runs.
    pub fn average_latency(&self) -> Duration {
        let ok: Vec<Duration> = self
            .outcomes
            .iter()
            .filter(|o| o.answer.is_ok())
            .map(|o| o.latency)
            .collect();
        if ok.is_empty() {
            return Duration::ZERO;
        }
        ok.iter().sum::<Duration>() / ok.len() as u32
    }

    /// How often each tool was used first, including "none".
    pub fn tool_usage(&self) -> BTreeMap<String, usize> {
        let mut usage = BTreeMap::new();
        for outcome in self.outcomes.iter().filter(|o| o.answer.is_ok()) {
            let tool = outcome.tool_used.clone().unwrap_or_else(|| "none".to_string());
            *usage.entry(tool).or_insert(0) += 1;
        }
        usage
    }
}

/// Run each case sequentially.
pub async fn run_suite(assistant: &TravelAssistant, cases: &[EvalCase]) -> EvalSummary {
    let mut summary = EvalSummary::default();

    for case in cases {
        let mut request = Request::new(case.question);
        request.city = case.city.map(str::to_string);

        let start = Instant::now();
        let result = assistant.run(request).await;
        let latency = start.elapsed();

        let outcome = match result {
            Ok(run) => CaseOutcome {
                case: *case,
                latency,
                tool_used: run.tool_used,
                answer: Ok(run.answer),
            },
            Err(e) => {
                warn!("Case '{}' failed: {}", case.question, e);
                CaseOutcome {
                    case: *case,
                    latency,
                    tool_used: None,
                    answer: Err(e.to_string()),
                }
            }
        };
        summary.outcomes.push(outcome);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::llm::scripted::ScriptedModel;
    use crate::llm::{Completion, ToolInvocation};
    use crate::tools::fakes::{toolbox, FixedSearch, FixedWeather};
    use std::sync::Arc;

    fn call(name: &str, arguments: &str) -> Completion {
        Completion {
            content: None,
            tool_calls: vec![ToolInvocation {
                id: "call_0".to_string(),
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_suite_scores_tool_choice() {
        let model = ScriptedModel::new(vec![
            call("get_weather", r#"{"city": "Paris"}"#),
            Completion::text("Sunny in Paris."),
            Completion::text("A passport is a travel document."),
            call("web_search", r#"{"query": "Lagos safety"}"#),
            Completion::text("Check advisories."),
        ]);
        let assistant = TravelAssistant::new(
            Arc::new(model),
            Arc::new(toolbox(FixedWeather::sunny(), FixedSearch(Some(Vec::new())))),
            Arc::new(Prompts::default()),
        );

        let summary = run_suite(&assistant, &DEFAULT_CASES[..4]).await;

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.passed(), 2);
        assert_eq!(summary.failures(), 1);

        let usage = summary.tool_usage();
        assert_eq!(usage.get("get_weather"), Some(&1));
        assert_eq!(usage.get("web_search"), Some(&1));
        assert_eq!(usage.get("none"), Some(&1));
    }

    #[test]
    fn test_average_latency_ignores_failures() {
        let case = DEFAULT_CASES[0];
        let summary = EvalSummary {
            outcomes: vec![
                CaseOutcome {
                    case,
                    latency: Duration::from_millis(100),
                    tool_used: Some("get_weather".to_string()),
                    answer: Ok("ok".to_string()),
                },
                CaseOutcome {
                    case,
                    latency: Duration::from_millis(300),
                    tool_used: Some("get_weather".to_string()),
                    answer: Ok("ok".to_string()),
                },
                CaseOutcome {
                    case,
                    latency: Duration::from_secs(30),
                    tool_used: None,
                    answer: Err("timeout".to_string()),
                },
            ],
        };

        assert_eq!(summary.average_latency(), Duration::from_millis(200));
        assert_eq!(EvalSummary::default().average_latency(), Duration::ZERO);
    }
}
