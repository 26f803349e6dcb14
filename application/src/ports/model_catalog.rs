//! Model catalog port.
//!
//! The catalog answers "is this model id currently known to the
//! gateway?" — used by configuration-validation paths, never by the
//! pipeline itself.

use async_trait::async_trait;
use council_domain::ModelId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from catalog access
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog fetch failed: {0}")]
    Fetch(String),

    #[error("Catalog response malformed: {0}")]
    Parse(String),
}

/// Information about one model known to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: ModelId,
    pub name: String,
    pub provider: String,
    pub context_length: u64,
    /// Prompt-token price as the gateway reports it
    pub pricing_prompt: f64,
    /// Completion-token price as the gateway reports it
    pub pricing_completion: f64,
}

/// Read contract over the gateway's model catalog.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// Whether the given id names a currently-available model.
    async fn lookup(&self, model: &ModelId) -> Result<bool, CatalogError>;

    /// All currently-known models.
    async fn models(&self) -> Result<Vec<ModelInfo>, CatalogError>;
}
