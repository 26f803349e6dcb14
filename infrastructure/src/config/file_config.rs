//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//!
//! Example configuration:
//!
//! ```toml
//! [council]
//! models = [
//!     "google/gemini-3-pro-preview",
//!     "anthropic/claude-opus-4.5",
//!     "x-ai/grok-4.1-fast",
//! ]
//! chairman = "google/gemini-3-pro-preview"
//! web_search = false
//!
//! [storage]
//! data_dir = "data/conversations"
//! ```

use council_domain::ModelId;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Council membership and chairman
    pub council: FileCouncilConfig,
    /// Gateway endpoints and credentials
    pub openrouter: FileOpenRouterConfig,
    /// Conversation storage settings
    pub storage: FileStorageConfig,
}

impl FileConfig {
    /// Structural validation, returning human-readable issues.
    ///
    /// Catalog-based validation (are these models real?) is separate and
    /// async; this only catches locally-detectable mistakes.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.council.models.is_empty() {
            issues.push("[council] models list is empty".to_string());
        }
        for model in &self.council.models {
            if model.trim().is_empty() {
                issues.push("[council] models contains an empty id".to_string());
            } else if !model.contains('/') {
                issues.push(format!(
                    "[council] model \"{}\" is not in provider/name form",
                    model
                ));
            }
        }
        if self.council.chairman.trim().is_empty() {
            issues.push("[council] chairman is empty".to_string());
        }
        if self.storage.data_dir.trim().is_empty() {
            issues.push("[storage] data_dir is empty".to_string());
        }

        issues
    }
}

/// Council configuration from TOML (`[council]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Council member model ids
    pub models: Vec<String>,
    /// Chairman model id (synthesizes the final answer)
    pub chairman: String,
    /// Append the web-search capability suffix to every model
    pub web_search: bool,
}

impl Default for FileCouncilConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "google/gemini-3-pro-preview".to_string(),
                "anthropic/claude-opus-4.5".to_string(),
                "x-ai/grok-4.1-fast".to_string(),
            ],
            chairman: "google/gemini-3-pro-preview".to_string(),
            web_search: false,
        }
    }
}

impl FileCouncilConfig {
    pub fn parse_models(&self) -> Vec<ModelId> {
        self.models.iter().map(ModelId::new).collect()
    }

    pub fn parse_chairman(&self) -> ModelId {
        ModelId::new(&self.chairman)
    }
}

/// Gateway configuration from TOML (`[openrouter]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenRouterConfig {
    /// Chat-completions endpoint
    pub api_url: String,
    /// Model-listing endpoint
    pub models_url: String,
    /// Environment variable holding the API key. The key itself never
    /// lives in the config file.
    pub api_key_env: String,
}

impl Default for FileOpenRouterConfig {
    fn default() -> Self {
        Self {
            api_url: crate::openrouter::types::OPENROUTER_API_URL.to_string(),
            models_url: crate::openrouter::types::OPENROUTER_MODELS_URL.to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
        }
    }
}

impl FileOpenRouterConfig {
    /// Read the API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Storage configuration from TOML (`[storage]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding one JSON file per conversation
    pub data_dir: String,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/conversations".to_string(),
        }
    }
}
