//! Success-or-typed-error result of a single model query.
//!
//! The query client never raises: every call resolves to a
//! [`QueryOutcome`] value, and callers match exhaustively. This is the
//! foundation of the pipeline's partial-failure tolerance — one model's
//! failure is just data alongside its peers' successes.

use super::error::QueryError;
use serde::{Deserialize, Serialize};

/// Successful completion payload from one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelReply {
    /// The completion's text content
    pub content: String,
    /// Opaque reasoning trace, passed through unmodified and never parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<serde_json::Value>,
}

impl ModelReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            reasoning: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: serde_json::Value) -> Self {
        self.reasoning = Some(reasoning);
        self
    }
}

/// Outcome of one model query: a reply or a typed error, never a panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    Success(ModelReply),
    Failure(QueryError),
}

impl QueryOutcome {
    pub fn success(content: impl Into<String>) -> Self {
        QueryOutcome::Success(ModelReply::new(content))
    }

    pub fn failure(error: QueryError) -> Self {
        QueryOutcome::Failure(error)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success(_))
    }

    /// The reply, if this outcome is a success
    pub fn reply(&self) -> Option<&ModelReply> {
        match self {
            QueryOutcome::Success(reply) => Some(reply),
            QueryOutcome::Failure(_) => None,
        }
    }

    /// The error, if this outcome is a failure
    pub fn error(&self) -> Option<&QueryError> {
        match self {
            QueryOutcome::Success(_) => None,
            QueryOutcome::Failure(error) => Some(error),
        }
    }
}

impl From<QueryError> for QueryOutcome {
    fn from(error: QueryError) -> Self {
        QueryOutcome::Failure(error)
    }
}
