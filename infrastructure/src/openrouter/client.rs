//! OpenRouter completion client.
//!
//! Implements the `ModelClient` port: one POST per query, bearer auth,
//! per-call timeout, and an exact mapping from HTTP status to typed
//! error kind. The client never panics and never returns through any
//! channel other than `QueryOutcome` — malformed bodies and transport
//! faults become `unknown` failures.

use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ModelsResponse, OPENROUTER_API_URL,
    OPENROUTER_MODELS_URL,
};
use async_trait::async_trait;
use council_application::{CatalogError, ModelClient, ModelInfo};
use council_domain::{Message, ModelId, ModelReply, QueryError, QueryOutcome};
use std::time::Duration;
use tracing::debug;

/// Timeout for the (fast, cacheable) model-listing call.
const MODELS_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the OpenRouter gateway.
pub struct OpenRouterClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
    models_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            api_url: OPENROUTER_API_URL.to_string(),
            models_url: OPENROUTER_MODELS_URL.to_string(),
        }
    }

    /// Override the completion endpoint (tests, proxies).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Override the model-listing endpoint.
    pub fn with_models_url(mut self, url: impl Into<String>) -> Self {
        self.models_url = url.into();
        self
    }

    /// Fetch the gateway's model catalog.
    ///
    /// Entries without a `provider/name` id are skipped; this powers the
    /// caching catalog, not the pipeline.
    pub async fn fetch_models(&self) -> Result<Vec<ModelInfo>, CatalogError> {
        let response = self
            .http
            .get(&self.models_url)
            .bearer_auth(&self.api_key)
            .timeout(MODELS_FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Fetch(format!("HTTP {}", status.as_u16())));
        }

        let body: ModelsResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let models: Vec<ModelInfo> = body
            .data
            .into_iter()
            .filter_map(|raw| raw.into_model_info())
            .collect();
        debug!("Fetched {} models from OpenRouter", models.len());
        Ok(models)
    }
}

/// Map an HTTP status to its error kind, or `None` for success.
///
/// The mapping must stay exact — each status class gets its own kind,
/// never a generic "HTTP error":
/// 401→auth, 402→payment, 404→not_found, 429→rate_limit, 5xx→server,
/// any other non-2xx→unknown.
fn classify_status(status: u16, model: &ModelId) -> Option<QueryError> {
    match status {
        200..=299 => None,
        401 => Some(QueryError::auth(model.clone())),
        402 => Some(QueryError::payment(model.clone())),
        404 => Some(QueryError::not_found(model.clone())),
        429 => Some(QueryError::rate_limit(model.clone())),
        500..=599 => Some(QueryError::server(model.clone(), status)),
        other => Some(
            QueryError::unknown(model.clone(), format!("Unexpected HTTP status {}.", other))
                .with_status(other),
        ),
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn query(
        &self,
        model: &ModelId,
        messages: &[Message],
        timeout: Duration,
    ) -> QueryOutcome {
        let request = ChatCompletionRequest {
            model: model.as_str(),
            messages,
        };

        let response = match self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return QueryError::timeout(model.clone(), timeout.as_secs_f64()).into();
            }
            Err(e) => {
                return QueryError::unknown(model.clone(), format!("Request failed: {}", e))
                    .into();
            }
        };

        if let Some(error) = classify_status(response.status().as_u16(), model) {
            return error.into();
        }

        let body: ChatCompletionResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return QueryError::timeout(model.clone(), timeout.as_secs_f64()).into();
            }
            Err(e) => {
                return QueryError::unknown(model.clone(), format!("Malformed response: {}", e))
                    .into();
            }
        };

        let Some(choice) = body.choices.into_iter().next() else {
            return QueryError::unknown(model.clone(), "Response contained no choices.").into();
        };

        let mut reply = ModelReply::new(choice.message.content.unwrap_or_default());
        if let Some(reasoning) = choice.message.reasoning_details {
            reply = reply.with_reasoning(reasoning);
        }
        QueryOutcome::Success(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::QueryErrorKind;

    fn kind_for(status: u16) -> Option<QueryErrorKind> {
        classify_status(status, &ModelId::new("a/b")).map(|e| e.kind)
    }

    #[test]
    fn test_status_mapping_is_exact() {
        assert_eq!(kind_for(200), None);
        assert_eq!(kind_for(204), None);
        assert_eq!(kind_for(401), Some(QueryErrorKind::Auth));
        assert_eq!(kind_for(402), Some(QueryErrorKind::Payment));
        assert_eq!(kind_for(404), Some(QueryErrorKind::NotFound));
        assert_eq!(kind_for(429), Some(QueryErrorKind::RateLimit));
        assert_eq!(kind_for(500), Some(QueryErrorKind::Server));
        assert_eq!(kind_for(503), Some(QueryErrorKind::Server));
        assert_eq!(kind_for(599), Some(QueryErrorKind::Server));
        // Other statuses are unknown, not shoehorned into a class
        assert_eq!(kind_for(400), Some(QueryErrorKind::Unknown));
        assert_eq!(kind_for(418), Some(QueryErrorKind::Unknown));
        assert_eq!(kind_for(301), Some(QueryErrorKind::Unknown));
    }

    #[test]
    fn test_classified_errors_carry_model_and_status() {
        let error = classify_status(429, &ModelId::new("x/y")).unwrap();
        assert_eq!(error.model, Some(ModelId::new("x/y")));
        assert_eq!(error.status_code, Some(429));

        let error = classify_status(418, &ModelId::new("x/y")).unwrap();
        assert_eq!(error.status_code, Some(418));
    }
}
