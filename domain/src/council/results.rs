//! Immutable per-run result types for the three pipeline stages.
//!
//! All of these are value objects created fresh per pipeline invocation
//! and never mutated after construction.

use super::aggregate::{AggregateEntry, TournamentEntry};
use super::error::{QueryError, StageErrors};
use super::label::LabelMap;
use crate::core::model::ModelId;
use serde::{Deserialize, Serialize};

/// One council model's answer from stage 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage1Response {
    pub model: ModelId,
    pub response: String,
}

impl Stage1Response {
    pub fn new(model: ModelId, response: impl Into<String>) -> Self {
        Self {
            model,
            response: response.into(),
        }
    }
}

/// One council model's ranking attempt from stage 2.
///
/// `parsed_ranking` is empty exactly when the raw output violated the
/// strict ranking contract; the ranker still "succeeded" at stage 2 for
/// error accounting, it just cast no vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2Ranking {
    pub model: ModelId,
    /// The ranker's raw output, verbatim
    pub ranking: String,
    /// Ordered labels, or empty on parse failure
    pub parsed_ranking: Vec<String>,
}

impl Stage2Ranking {
    pub fn new(model: ModelId, ranking: impl Into<String>, parsed_ranking: Vec<String>) -> Self {
        Self {
            model,
            ranking: ranking.into(),
            parsed_ranking,
        }
    }

    /// Whether this ranking contributes positions to aggregation
    pub fn has_vote(&self) -> bool {
        !self.parsed_ranking.is_empty()
    }
}

/// The chairman's final synthesis from stage 3.
///
/// A chairman failure is folded into this type — the response text stays
/// displayable and the typed error rides alongside — so callers always
/// receive something to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage3Synthesis {
    pub model: ModelId,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<QueryError>,
}

impl Stage3Synthesis {
    pub fn success(model: ModelId, response: impl Into<String>) -> Self {
        Self {
            model,
            response: response.into(),
            error: None,
        }
    }

    pub fn failure(model: ModelId, error: QueryError) -> Self {
        Self {
            model,
            response: format!("Error: {}", error.message),
            error: Some(error),
        }
    }

    /// Synthesized answer for a stage-1 total failure. Carries the
    /// sentinel model id `"error"` and a grouped failure summary.
    pub fn all_models_failed(summary: &str) -> Self {
        Self {
            model: ModelId::new("error"),
            response: format!("All models failed to respond. {}", summary),
            error: None,
        }
    }

    /// Synthesized answer for an empty-input validation failure.
    pub fn empty_input() -> Self {
        Self {
            model: ModelId::new("error"),
            response: "No messages provided. Please enter a query.".to_string(),
            error: None,
        }
    }
}

/// Everything the pipeline learned beyond the answers themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CouncilMetadata {
    pub label_to_model: LabelMap,
    pub aggregate_rankings: Vec<AggregateEntry>,
    pub tournament_rankings: Vec<TournamentEntry>,
    pub council_models: Vec<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chairman_model: Option<ModelId>,
    /// Present only when at least one stage recorded an error. `None`
    /// means the run was clean, distinguishing it from a run with empty
    /// but present error lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<StageErrors>,
}

impl CouncilMetadata {
    /// Attach stage errors, collapsing an all-empty structure to `None`.
    pub fn with_errors(mut self, errors: StageErrors) -> Self {
        self.errors = if errors.is_empty() {
            None
        } else {
            Some(errors)
        };
        self
    }
}

/// Complete result of one council deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouncilOutcome {
    pub stage1: Vec<Stage1Response>,
    pub stage2: Vec<Stage2Ranking>,
    pub stage3: Stage3Synthesis,
    pub metadata: CouncilMetadata,
}

impl CouncilOutcome {
    pub fn new(
        stage1: Vec<Stage1Response>,
        stage2: Vec<Stage2Ranking>,
        stage3: Stage3Synthesis,
        metadata: CouncilMetadata,
    ) -> Self {
        Self {
            stage1,
            stage2,
            stage3,
            metadata,
        }
    }
}
