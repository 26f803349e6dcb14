//! OpenRouter gateway adapters.
//!
//! - [`client::OpenRouterClient`] — the `ModelClient` implementation:
//!   one POST per completion, with the exact status-to-error-kind
//!   mapping the pipeline's failure accounting depends on
//! - [`catalog::CachingModelCatalog`] — TTL cache over the gateway's
//!   model listing with a single-flight refresh guard

pub mod catalog;
pub mod client;
pub mod types;

pub use catalog::CachingModelCatalog;
pub use client::OpenRouterClient;
