//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelId`] — opaque identifier for one LLM on the gateway

pub mod model;
