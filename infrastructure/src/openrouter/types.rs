//! Wire types for the OpenRouter HTTP API.
//!
//! Response shapes are deliberately lenient everywhere except where the
//! pipeline needs exactness: a malformed completion body becomes a typed
//! `unknown` failure upstream, and catalog entries that don't parse are
//! skipped rather than failing the whole listing.

use council_application::ModelInfo;
use council_domain::{Message, ModelId};
use serde::{Deserialize, Serialize};

/// Default chat-completions endpoint.
pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model-listing endpoint.
pub const OPENROUTER_MODELS_URL: &str = "https://openrouter.ai/api/v1/models";

/// Body of one completion request.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
}

/// Body of a completion response; only the fields the core reads.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
    /// Opaque reasoning trace; passed through, never interpreted
    #[serde(default)]
    pub reasoning_details: Option<serde_json::Value>,
}

/// Body of the model-listing response.
#[derive(Debug, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub data: Vec<RawModel>,
}

/// One catalog entry as the gateway reports it. Numeric fields arrive
/// inconsistently typed (numbers or strings), hence the lenient values.
#[derive(Debug, Deserialize)]
pub struct RawModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub context_length: Option<serde_json::Value>,
    #[serde(default)]
    pub pricing: Option<RawPricing>,
}

#[derive(Debug, Deserialize)]
pub struct RawPricing {
    #[serde(default)]
    pub prompt: Option<serde_json::Value>,
    #[serde(default)]
    pub completion: Option<serde_json::Value>,
}

impl RawModel {
    /// Convert to a [`ModelInfo`], skipping entries without a proper
    /// `provider/name` id. Malformed numeric fields default to zero.
    pub fn into_model_info(self) -> Option<ModelInfo> {
        let id = self.id?;
        let provider = id.split_once('/')?.0.to_string();

        let (pricing_prompt, pricing_completion) = match &self.pricing {
            Some(pricing) => (
                safe_f64(pricing.prompt.as_ref()),
                safe_f64(pricing.completion.as_ref()),
            ),
            None => (0.0, 0.0),
        };

        Some(ModelInfo {
            name: self.name.unwrap_or_else(|| id.clone()),
            id: ModelId::new(id),
            provider,
            context_length: safe_u64(self.context_length.as_ref()),
            pricing_prompt,
            pricing_completion,
        })
    }
}

fn safe_f64(value: Option<&serde_json::Value>) -> f64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn safe_u64(value: Option<&serde_json::Value>) -> u64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_model_parses_string_pricing() {
        let raw: RawModel = serde_json::from_str(
            r#"{
                "id": "anthropic/claude-opus-4.5",
                "name": "Claude Opus 4.5",
                "context_length": 200000,
                "pricing": {"prompt": "0.000005", "completion": "0.000025"}
            }"#,
        )
        .unwrap();

        let info = raw.into_model_info().unwrap();
        assert_eq!(info.id, ModelId::new("anthropic/claude-opus-4.5"));
        assert_eq!(info.provider, "anthropic");
        assert_eq!(info.context_length, 200_000);
        assert_eq!(info.pricing_prompt, 0.000005);
    }

    #[test]
    fn test_raw_model_without_provider_prefix_is_skipped() {
        let raw: RawModel =
            serde_json::from_str(r#"{"id": "not-a-routable-id"}"#).unwrap();
        assert!(raw.into_model_info().is_none());
    }

    #[test]
    fn test_raw_model_malformed_numbers_default_to_zero() {
        let raw: RawModel = serde_json::from_str(
            r#"{
                "id": "a/b",
                "context_length": "lots",
                "pricing": {"prompt": null, "completion": "free?"}
            }"#,
        )
        .unwrap();

        let info = raw.into_model_info().unwrap();
        assert_eq!(info.context_length, 0);
        assert_eq!(info.pricing_prompt, 0.0);
        assert_eq!(info.pricing_completion, 0.0);
        assert_eq!(info.name, "a/b");
    }

    #[test]
    fn test_completion_request_serializes_messages() {
        let messages = vec![Message::user("hello")];
        let request = ChatCompletionRequest {
            model: "a/b",
            messages: &messages,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "a/b");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hello");
    }
}
