//! Infrastructure layer for llm-council
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the OpenRouter gateway client and model-catalog
//! cache, JSON-file conversation storage, and configuration file loading.

pub mod config;
pub mod openrouter;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileCouncilConfig, FileOpenRouterConfig, FileStorageConfig,
};
pub use openrouter::{
    catalog::{CachingModelCatalog, CatalogFetcher, Clock, SystemClock},
    client::OpenRouterClient,
};
pub use storage::JsonConversationStore;
