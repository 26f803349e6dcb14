//! Typed query errors and the human-readable failure summary.
//!
//! Every failed model call is represented as a [`QueryError`] value with a
//! kind from a closed set. Failures are data, not exceptions: the query
//! client returns them, the pipeline collects them per stage, and
//! [`summarize_errors`] renders a grouped summary when stage 1 fails
//! completely.

use crate::core::model::ModelId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of failure kinds for model queries.
///
/// The HTTP-status mapping is exact: 401→`Auth`, 402→`Payment`,
/// 404→`NotFound`, 429→`RateLimit`, 5xx→`Server`. Transport timeouts map
/// to `Timeout`; `Validation` is reserved for pipeline-level input errors;
/// everything else is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorKind {
    Auth,
    Payment,
    NotFound,
    RateLimit,
    Server,
    Timeout,
    Validation,
    Unknown,
}

impl QueryErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryErrorKind::Auth => "auth",
            QueryErrorKind::Payment => "payment",
            QueryErrorKind::NotFound => "not_found",
            QueryErrorKind::RateLimit => "rate_limit",
            QueryErrorKind::Server => "server",
            QueryErrorKind::Timeout => "timeout",
            QueryErrorKind::Validation => "validation",
            QueryErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured error from a failed model query.
///
/// Attributable to exactly one kind, and (for client-originated failures)
/// exactly one model. Pipeline-level validation errors carry no model.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct QueryError {
    #[serde(rename = "error_type")]
    pub kind: QueryErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelId>,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            model: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    pub fn with_model(mut self, model: ModelId) -> Self {
        self.model = Some(model);
        self
    }

    /// Invalid or missing credentials (HTTP 401)
    pub fn auth(model: ModelId) -> Self {
        Self::new(
            QueryErrorKind::Auth,
            "Invalid API key. Please check your OPENROUTER_API_KEY.",
        )
        .with_status(401)
        .with_model(model)
    }

    /// Out of credits (HTTP 402)
    pub fn payment(model: ModelId) -> Self {
        Self::new(
            QueryErrorKind::Payment,
            "Payment required. Please add credits to your OpenRouter account.",
        )
        .with_status(402)
        .with_model(model)
    }

    /// Unknown model id (HTTP 404)
    pub fn not_found(model: ModelId) -> Self {
        Self::new(
            QueryErrorKind::NotFound,
            format!("Model \"{}\" not found on OpenRouter.", model),
        )
        .with_status(404)
        .with_model(model)
    }

    /// Rate limited (HTTP 429)
    pub fn rate_limit(model: ModelId) -> Self {
        Self::new(
            QueryErrorKind::RateLimit,
            "Rate limit exceeded. Please wait before retrying.",
        )
        .with_status(429)
        .with_model(model)
    }

    /// Upstream server error (HTTP 5xx)
    pub fn server(model: ModelId, status: u16) -> Self {
        Self::new(
            QueryErrorKind::Server,
            format!("OpenRouter server error (HTTP {}). Please try again.", status),
        )
        .with_status(status)
        .with_model(model)
    }

    /// Request exceeded its deadline
    pub fn timeout(model: ModelId, timeout_secs: f64) -> Self {
        Self::new(
            QueryErrorKind::Timeout,
            format!("Request timed out after {}s.", timeout_secs),
        )
        .with_model(model)
    }

    /// Pipeline-level input validation failure (no model attached)
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::Validation, message)
    }

    /// Anything unclassified: unexpected status, malformed body, transport fault
    pub fn unknown(model: ModelId, message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::Unknown, message).with_model(model)
    }
}

/// Per-stage error lists surfaced through pipeline metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageErrors {
    pub stage1: Vec<QueryError>,
    pub stage2: Vec<QueryError>,
    pub stage3: Vec<QueryError>,
}

impl StageErrors {
    pub fn is_empty(&self) -> bool {
        self.stage1.is_empty() && self.stage2.is_empty() && self.stage3.is_empty()
    }

    /// Total number of errors across all stages
    pub fn len(&self) -> usize {
        self.stage1.len() + self.stage2.len() + self.stage3.len()
    }
}

/// Render a grouped, human-readable summary of collected errors.
///
/// Groups by kind first, then renders one clause per kind present,
/// joined with `"; "`. Used for the synthesized answer when stage 1
/// produces zero successes.
pub fn summarize_errors(errors: &[QueryError]) -> String {
    if errors.is_empty() {
        return "Please try again.".to_string();
    }

    let mut by_kind: std::collections::BTreeMap<QueryErrorKind, Vec<&QueryError>> =
        std::collections::BTreeMap::new();
    for error in errors {
        by_kind.entry(error.kind).or_default().push(error);
    }

    let mut summaries = Vec::new();
    if by_kind.contains_key(&QueryErrorKind::Auth) {
        summaries.push("API key issue - please check your OPENROUTER_API_KEY".to_string());
    }
    if by_kind.contains_key(&QueryErrorKind::Payment) {
        summaries.push("Payment required - please add credits to OpenRouter".to_string());
    }
    if let Some(rate_limited) = by_kind.get(&QueryErrorKind::RateLimit) {
        summaries.push(format!("{} model(s) rate limited", rate_limited.len()));
    }
    if let Some(not_found) = by_kind.get(&QueryErrorKind::NotFound) {
        let models: Vec<String> = not_found
            .iter()
            .map(|e| {
                e.model
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            })
            .collect();
        summaries.push(format!("Model(s) not found: {}", models.join(", ")));
    }
    if let Some(timed_out) = by_kind.get(&QueryErrorKind::Timeout) {
        summaries.push(format!("{} model(s) timed out", timed_out.len()));
    }
    if by_kind.contains_key(&QueryErrorKind::Server) {
        summaries.push("OpenRouter server error".to_string());
    }

    if summaries.is_empty() {
        "Please try again.".to_string()
    } else {
        summaries.join("; ")
    }
}
