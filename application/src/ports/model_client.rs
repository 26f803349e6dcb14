//! Model query port and the parallel fan-out over it.
//!
//! The client is infallible at the type level: every call resolves to a
//! [`QueryOutcome`] value. Failure is data — that is what lets the
//! fan-out run to completion regardless of individual models' fates.

use async_trait::async_trait;
use council_domain::{Message, ModelId, QueryError, QueryOutcome};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::warn;

/// Default per-call timeout for council queries.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(120);

/// Gateway for querying one named model.
///
/// Implementations must not panic and must not return early errors
/// through any channel other than `QueryOutcome::Failure` — malformed
/// responses, transport faults, and HTTP error statuses all map to typed
/// failures per the closed error-kind set.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Issue one completion request to one model.
    ///
    /// `messages` must be non-empty; `timeout` bounds the whole round
    /// trip.
    async fn query(&self, model: &ModelId, messages: &[Message], timeout: Duration)
    -> QueryOutcome;
}

/// Query several models concurrently, joining all results.
///
/// One entry per distinct input model, in the caller's list order; a
/// duplicated id collapses to its first occurrence. No call is cancelled
/// because a sibling failed — the slowest call (or its timeout) bounds
/// the whole fan-out, and attribution of outcome to model is exact
/// regardless of completion order.
pub async fn query_all<C: ModelClient + 'static>(
    client: &Arc<C>,
    models: &[ModelId],
    messages: &[Message],
    timeout: Duration,
) -> Vec<(ModelId, QueryOutcome)> {
    let mut seen = HashSet::new();
    let models: Vec<ModelId> = models
        .iter()
        .filter(|m| seen.insert((*m).clone()))
        .cloned()
        .collect();

    let mut join_set = JoinSet::new();
    for (index, model) in models.iter().enumerate() {
        let client = Arc::clone(client);
        let model = model.clone();
        let messages = messages.to_vec();
        join_set.spawn(async move {
            let outcome = client.query(&model, &messages, timeout).await;
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<QueryOutcome>> = vec![None; models.len()];
    let mut next_fallback = 0usize;

    while let Some(result) = join_set.join_next().await {
        match result {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => {
                // A panicking task loses its index; attribute the failure
                // to the first model still missing an outcome.
                warn!("Fan-out task join error: {}", e);
                while next_fallback < outcomes.len() && outcomes[next_fallback].is_some() {
                    next_fallback += 1;
                }
                if next_fallback < outcomes.len() {
                    outcomes[next_fallback] = Some(QueryOutcome::failure(
                        QueryError::unknown(
                            models[next_fallback].clone(),
                            format!("Query task failed: {}", e),
                        ),
                    ));
                }
            }
        }
    }

    models
        .into_iter()
        .zip(outcomes)
        .map(|(model, outcome)| {
            let outcome = outcome.unwrap_or_else(|| {
                QueryOutcome::failure(QueryError::unknown(model.clone(), "Query task vanished"))
            });
            (model, outcome)
        })
        .collect()
}
