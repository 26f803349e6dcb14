//! Application layer for llm-council
//!
//! Use cases orchestrating the council deliberation, and the ports they
//! depend on. Adapters for the ports live in the infrastructure layer.

pub mod ports;
pub mod use_cases;

pub use ports::{
    conversation_store::{ConversationStore, StoreError},
    event_sink::{ChannelSink, CouncilEvent, CouncilEventSink, NoopSink, Stage2Metadata},
    model_catalog::{CatalogError, ModelCatalog, ModelInfo},
    model_client::{DEFAULT_QUERY_TIMEOUT, ModelClient, query_all},
};
pub use use_cases::{
    direct::DirectResponseUseCase,
    run_council::{CouncilInput, RunCouncilUseCase},
    title::{GenerateTitleUseCase, TITLE_TIMEOUT},
    validate_models::ValidateModelsUseCase,
};
