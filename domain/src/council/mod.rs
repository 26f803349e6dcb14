//! Council deliberation domain
//!
//! Everything the three-stage deliberation pipeline computes over lives
//! here: the typed query error taxonomy, anonymization labels, the strict
//! ranking parser, and the two rank-aggregation algorithms.
//!
//! # Pipeline data flow
//!
//! ```text
//! query + history
//!     │
//!     ▼
//! Stage 1 ── fan-out ──► Stage1Response per surviving model
//!     │
//!     ▼
//! labels (Response A, Response B, …) ──► LabelMap
//!     │
//!     ▼
//! Stage 2 ── fan-out ──► Stage2Ranking per ranker (parsed or empty)
//!     │
//!     ├──► aggregate_rankings   (mean position)
//!     ├──► tournament_rankings  (pairwise majority)
//!     ▼
//! Stage 3 ── chairman ──► Stage3Synthesis
//! ```

pub mod aggregate;
pub mod error;
pub mod label;
pub mod outcome;
pub mod ranking;
pub mod results;

// Re-export main types
pub use aggregate::{AggregateEntry, TournamentEntry, aggregate_rankings, tournament_rankings};
pub use error::{QueryError, QueryErrorKind, StageErrors, summarize_errors};
pub use label::{LabelMap, alpha_label, response_label};
pub use outcome::{ModelReply, QueryOutcome};
pub use ranking::parse_ranking;
pub use results::{CouncilMetadata, CouncilOutcome, Stage1Response, Stage2Ranking, Stage3Synthesis};
