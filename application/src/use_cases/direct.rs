//! Chairman-only direct response.
//!
//! Bypasses all three deliberation stages: one call to the chairman over
//! the full message history. Used for follow-up refinement turns where
//! re-running the whole council would add latency without new signal.

use crate::ports::model_client::{DEFAULT_QUERY_TIMEOUT, ModelClient};
use council_domain::{Message, ModelId, QueryOutcome, Stage3Synthesis};
use std::sync::Arc;
use tracing::{info, warn};

/// Use case for a single-model chairman response
pub struct DirectResponseUseCase<C: ModelClient> {
    client: Arc<C>,
}

impl<C: ModelClient> DirectResponseUseCase<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Ask the chairman directly. Always returns something displayable;
    /// failures are folded into the synthesis like a stage-3 error.
    pub async fn execute(
        &self,
        chairman: &ModelId,
        messages: &[Message],
        web_search: bool,
    ) -> Stage3Synthesis {
        if messages.is_empty() {
            return Stage3Synthesis::empty_input();
        }

        let chairman = if web_search {
            chairman.with_web_search()
        } else {
            chairman.clone()
        };

        info!("Direct response from chairman {}", chairman);

        match self
            .client
            .query(&chairman, messages, DEFAULT_QUERY_TIMEOUT)
            .await
        {
            QueryOutcome::Success(reply) => Stage3Synthesis::success(chairman, reply.content),
            QueryOutcome::Failure(error) => {
                warn!("Direct response failed: {}", error);
                Stage3Synthesis::failure(chairman, error)
            }
        }
    }
}
