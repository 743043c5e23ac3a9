//! Doctor command - verify configuration and credentials.

use crate::cli::Output;
use crate::config::{Settings, WeatherProviderKind};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: Option<&str>) -> anyhow::Result<()> {
    Output::header("Waypoint Doctor");
    println!();
    println!("Checking configuration and credentials...\n");

    let api = vec![
        check_openai_api_key(settings, std::env::var("OPENAI_API_KEY").ok()),
        check_weather(settings, std::env::var("OPENWEATHER_API_KEY").ok()),
    ];
    print_section("API Configuration", &api);

    let dirs = check_directories(settings);
    print_section("Directories", &dirs);

    let config = vec![check_config_file(config_path)];
    print_section("Configuration", &config);

    let checks: Vec<&CheckResult> = api.iter().chain(&dirs).chain(&config).collect();
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Waypoint.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Waypoint is ready to use.");
    }

    Ok(())
}

/// Show the first and last few characters of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_openai_api_key(settings: &Settings, env_key: Option<String>) -> CheckResult {
    let name = "OpenAI API key";
    if let Some(base) = settings.llm.api_base.as_deref().filter(|b| !b.is_empty()) {
        return CheckResult::ok(name, &format!("custom endpoint {}", base));
    }

    let key = settings
        .llm
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or(env_key);

    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            CheckResult::ok(name, &format!("configured ({})", mask(&key)))
        }
        Some(key) if key.is_empty() => CheckResult::error(
            name,
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Some(_) => CheckResult::warning(
            name,
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(
            name,
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

fn check_weather(settings: &Settings, env_key: Option<String>) -> CheckResult {
    let name = "Weather provider";
    match settings.weather.provider {
        WeatherProviderKind::Simulated => CheckResult::warning(
            name,
            "simulated (random readings)",
            "Set weather.provider = \"openweathermap\" for live data",
        ),
        WeatherProviderKind::OpenWeatherMap => {
            let key = settings
                .weather
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .or(env_key.filter(|k| !k.is_empty()));
            match key {
                Some(key) => CheckResult::ok(name, &format!("openweathermap ({})", mask(&key))),
                None => CheckResult::error(
                    name,
                    "OPENWEATHER_API_KEY not set",
                    "Export OPENWEATHER_API_KEY or set weather.provider = \"simulated\"",
                ),
            }
        }
    }
}

fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    results.push(check_documents(&settings.documents_dir()));

    if settings.vector_store.provider == "sqlite" {
        let db_path = settings.sqlite_path();
        if db_path.exists() {
            let size = std::fs::metadata(&db_path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            results.push(CheckResult::ok(
                "Index",
                &format!("{} ({})", db_path.display(), size),
            ));
        } else {
            results.push(CheckResult::warning(
                "Index",
                &format!("{} (not created yet)", db_path.display()),
                "Run 'waypoint ingest' to build it",
            ));
        }
    } else {
        results.push(CheckResult::warning(
            "Index",
            &format!("{} (not persisted)", settings.vector_store.provider),
            "Documents are re-indexed every run",
        ));
    }

    results
}

fn check_documents(dir: &Path) -> CheckResult {
    let name = "Documents";
    let Ok(entries) = std::fs::read_dir(dir) else {
        return CheckResult::warning(
            name,
            &format!("{} (missing)", dir.display()),
            "Create it and add .txt or .md files, then run 'waypoint ingest'",
        );
    };

    let count = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|x| x.to_str())
                .map(|x| matches!(x.to_lowercase().as_str(), "txt" | "md" | "markdown"))
                .unwrap_or(false)
        })
        .count();

    if count == 0 {
        CheckResult::warning(
            name,
            &format!("{} (no .txt/.md files)", dir.display()),
            "Add travel notes to answer document questions",
        )
    } else {
        CheckResult::ok(name, &format!("{} ({} files)", dir.display(), count))
    }
}

fn check_config_file(config_path: Option<&str>) -> CheckResult {
    let path = config_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    if path.exists() {
        CheckResult::ok("Config file", &path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override settings", path.display()),
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
