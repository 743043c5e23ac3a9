//! CLI output formatting utilities.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print an answer block.
    pub fn answer(text: &str) {
        println!("\n{}\n", text.trim());
    }

    /// Print a tool call and a preview of its result.
    pub fn tool_call(call: &str, result: &str) {
        println!("  {} {}", style("->").cyan(), style(call).bold());
        println!("     {}", style(preview(result, 160)).dim());
    }

    /// Print one evaluation case outcome.
    pub fn eval_case(ok: bool, question: &str, tool: Option<&str>, millis: u128) {
        let mark = if ok { style("PASS").green().bold() } else { style("FAIL").red().bold() };
        println!(
            "  {} {} ({}, {} ms)",
            mark,
            question,
            style(tool.unwrap_or("no tool")).cyan(),
            millis
        );
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Flatten to one line and truncate on a char boundary.
fn preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("a\nb", 10), "a b");
        assert_eq!(preview("ééééé", 3), "ééé...");
    }
}
