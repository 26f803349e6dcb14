//! Command-line interface definition

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for council results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// All stages: responses, rankings, and synthesis
    Full,
    /// Final synthesis only
    Synthesis,
    /// Machine-readable JSON
    Json,
}

/// Multi-model LLM council: fan a question out to a council of models,
/// have them rank each other's anonymized answers, and let a chairman
/// synthesize the final response.
#[derive(Debug, Parser)]
#[command(name = "llm-council", version, about)]
pub struct Cli {
    /// The question to put to the council
    pub question: Option<String>,

    /// Council member model id (repeatable; defaults from config)
    #[arg(short, long = "model")]
    pub model: Vec<String>,

    /// Chairman model id (defaults from config)
    #[arg(long)]
    pub chairman: Option<String>,

    /// Enable web search for every model in this run
    #[arg(long)]
    pub web_search: bool,

    /// Conversation id to continue (created if missing); the run is
    /// persisted into it
    #[arg(long)]
    pub conversation: Option<String>,

    /// Skip deliberation: ask the chairman directly (follow-up turns)
    #[arg(long)]
    pub direct: bool,

    /// Path to a config file (highest priority)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ignore all config files and use built-in defaults
    #[arg(long)]
    pub no_config: bool,

    /// Check configured models against the gateway catalog, then exit
    #[arg(long)]
    pub validate_models: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Suppress progress display
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
