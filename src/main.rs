//! Waypoint CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use waypoint::cli::{commands, Cli, Commands};
use waypoint::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&Settings::expand_path(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("waypoint={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Ask { question, city } => {
            commands::run_ask(&question, city, settings).await?;
        }

        Commands::Assist {
            question,
            city,
            show_tools,
        } => {
            commands::run_assist(&question, city, show_tools, settings).await?;
        }

        Commands::Ingest { dir, force } => {
            commands::run_ingest(dir, force, settings).await?;
        }

        Commands::Weather { city } => {
            commands::run_weather(&city, settings).await?;
        }

        Commands::Define { word } => {
            commands::run_define(&word, settings)?;
        }

        Commands::Search { query, limit } => {
            commands::run_search(&query, limit, settings).await?;
        }

        Commands::Eval => {
            commands::run_eval(settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, config_path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, config_path, settings)?;
        }
    }

    Ok(())
}
