//! Ingest command: index travel documents.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::DocumentIndex;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(dir: Option<String>, force: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let dir = dir
        .map(|d| Settings::expand_path(&d))
        .unwrap_or_else(|| settings.documents_dir());
    let index = DocumentIndex::new(&settings)?;

    let spinner = Output::spinner(&format!("Indexing {}...", dir.display()));
    let result = index.index(Some(&dir), force).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            Output::error(&format!("Indexing failed: {}", e));
            return Err(e.into());
        }
    };

    for (source, chunks) in &report.indexed {
        Output::list_item(&format!("{} ({} chunks)", source, chunks));
    }
    for source in &report.skipped {
        Output::list_item(&format!("{} (already indexed)", source));
    }

    Output::success(&format!(
        "Indexed {} file(s), {} chunk(s)",
        report.indexed.len(),
        report.total_chunks()
    ));
    if !report.skipped.is_empty() && !force {
        Output::info("Use --force to re-index skipped files.");
    }

    let sources = index.vector_store().list_sources().await?;
    let total: u32 = sources.iter().map(|s| s.chunk_count).sum();
    Output::kv("Index", &format!("{} file(s), {} chunk(s)", sources.len(), total));
    Output::kv("Source", &dir.display().to_string());

    Ok(())
}
