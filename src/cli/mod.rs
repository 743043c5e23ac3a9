//! CLI module for Waypoint.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Waypoint - an agentic travel assistant
///
/// Routes travel questions to live weather, your own travel documents,
/// a phrase dictionary or web search, and answers with an LLM.
#[derive(Parser, Debug)]
#[command(name = "waypoint")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "WAYPOINT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a question through the router (weather or documents)
    Ask {
        /// The question to ask
        question: String,

        /// City for weather questions
        #[arg(long)]
        city: Option<String>,
    },

    /// Ask the tool-calling assistant
    Assist {
        /// The question to ask
        question: String,

        /// City the question is about
        #[arg(long)]
        city: Option<String>,

        /// Print every tool call the assistant made
        #[arg(long)]
        show_tools: bool,
    },

    /// Index travel documents for retrieval
    Ingest {
        /// Directory of .txt/.md files (defaults to documents.dir)
        dir: Option<String>,

        /// Re-index files that are already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Show current weather for a city
    Weather {
        city: String,
    },

    /// Look up a travel term
    Define {
        word: String,
    },

    /// Search the web
    Search {
        query: String,

        /// Maximum number of results (defaults to search.max_results)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Run the assistant against a fixed set of questions
    Eval,

    /// Check configuration and API access
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
