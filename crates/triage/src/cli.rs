use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "triage")]
#[command(version)]
#[command(about = "Route problem descriptions to specialist handlers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the engine's configuration and capability profiles
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// Routing thresholds as JSON (missing fields keep their defaults)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Capability profiles as a JSON array (replaces the builtin registry)
    #[arg(long)]
    pub profiles: Option<PathBuf>,

    /// Learned tracker state as JSON (read if present; `feedback` writes it back)
    #[arg(long)]
    pub state: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick a handler for a request and print the decision as JSON
    Route {
        /// Request text
        #[arg(required = true)]
        request: Vec<String>,

        /// Conversation history as a JSON array
        #[arg(long)]
        history: Option<PathBuf>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Replay execution outcomes (JSONL) and print learned statistics
    Feedback {
        /// JSONL file of {request, handler, metrics} records
        file: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List capability profiles
    Profiles {
        #[arg(long)]
        profiles: Option<PathBuf>,
    },

    /// Print version information
    Version,
}
