//! Presentation layer for llm-council
//!
//! CLI argument definitions, console output formatting, and progress
//! reporting driven by the pipeline's lifecycle events.

pub mod cli;
pub mod output;
pub mod progress;

pub use cli::{Cli, OutputFormat};
pub use output::ConsoleFormatter;
pub use progress::ProgressReporter;
