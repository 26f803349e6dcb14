//! Conversation-title generation.
//!
//! One quick chairman call with a tightened timeout; any failure falls
//! back to the default title rather than surfacing an error.

use crate::ports::model_client::ModelClient;
use council_domain::session::conversation::DEFAULT_TITLE;
use council_domain::{Message, ModelId, PromptTemplate, QueryOutcome};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Title generation is latency-sensitive; don't wait the full query
/// timeout for it.
pub const TITLE_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_TITLE_LEN: usize = 50;

/// Use case for generating a short conversation title
pub struct GenerateTitleUseCase<C: ModelClient> {
    client: Arc<C>,
}

impl<C: ModelClient> GenerateTitleUseCase<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Generate a 3-5 word title for the first user message.
    ///
    /// Never fails: a query error yields the default title.
    pub async fn execute(&self, model: &ModelId, first_query: &str) -> String {
        let prompt = PromptTemplate::title_prompt(first_query);
        let messages = vec![Message::user(prompt)];

        match self.client.query(model, &messages, TITLE_TIMEOUT).await {
            QueryOutcome::Success(reply) => clean_title(&reply.content),
            QueryOutcome::Failure(error) => {
                debug!("Title generation failed, using fallback: {}", error);
                DEFAULT_TITLE.to_string()
            }
        }
    }
}

/// Strip wrapping quotes and clamp length.
fn clean_title(raw: &str) -> String {
    let title = raw.trim().trim_matches(['"', '\'']).trim();

    if title.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    if title.chars().count() > MAX_TITLE_LEN {
        let truncated: String = title.chars().take(MAX_TITLE_LEN - 3).collect();
        format!("{}...", truncated)
    } else {
        title.to_string()
    }
}
