//! Direct tool commands: weather, define, search.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::build_weather_source;
use crate::tools::{search_or_sentinel, Dictionary, DuckDuckGo};
use anyhow::Result;

/// Show current weather for a city.
pub async fn run_weather(city: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Weather, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let source = build_weather_source(&settings)?;
    match source.get_weather(city).await {
        Ok(report) => Output::answer(&report.summary(source.units())),
        Err(e) => {
            Output::error(&format!("Weather lookup failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Look up a travel term.
pub fn run_define(word: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Offline, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let dictionary = Dictionary::new().with_entries(&settings.dictionary.entries);
    Output::answer(&dictionary.lookup(word));
    Ok(())
}

/// Search the web.
pub async fn run_search(query: &str, limit: Option<usize>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Offline, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let limit = limit.unwrap_or(settings.search.max_results);
    let search = DuckDuckGo::new(&settings.search)?;

    let spinner = Output::spinner("Searching...");
    let answer = search_or_sentinel(&search, query, limit).await;
    spinner.finish_and_clear();

    Output::answer(&answer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_needs_no_credentials() {
        let mut settings = Settings::default();
        settings.llm.api_key = None;
        settings.weather.api_key = None;
        assert!(run_define("visa", settings).is_ok());
    }

    #[tokio::test]
    async fn test_search_failure_prints_sentinel_instead_of_erroring() {
        let mut settings = Settings::default();
        settings.search.endpoint = "http://127.0.0.1:9/".to_string();
        settings.search.timeout_secs = 2;
        assert!(run_search("Lagos safety", Some(3), settings).await.is_ok());
    }
}
