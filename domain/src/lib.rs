//! Domain layer for llm-council
//!
//! This crate contains the core deliberation logic, entities, and value
//! objects. It has no dependencies on infrastructure or presentation
//! concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is a panel of LLMs that deliberates over a user query in
//! three stages:
//!
//! - **Stage 1**: every council model answers the query independently
//! - **Stage 2**: every council model ranks the anonymized answers of
//!   its peers
//! - **Stage 3**: a designated chairman model synthesizes the final
//!   answer from the raw answers and the ranking signals
//!
//! The ranking signals are aggregated two ways: mean-position averaging
//! and pairwise tournament comparison.

pub mod core;
pub mod council;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use crate::core::model::ModelId;
pub use council::{
    aggregate::{AggregateEntry, TournamentEntry, aggregate_rankings, tournament_rankings},
    error::{QueryError, QueryErrorKind, StageErrors, summarize_errors},
    label::{LabelMap, alpha_label, response_label},
    outcome::{ModelReply, QueryOutcome},
    ranking::parse_ranking,
    results::{CouncilMetadata, CouncilOutcome, Stage1Response, Stage2Ranking, Stage3Synthesis},
};
pub use prompt::PromptTemplate;
pub use session::{
    conversation::{Conversation, ConversationMessage, ConversationSummary},
    entities::{Message, Role},
};
