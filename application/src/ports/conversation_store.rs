//! Conversation persistence port.
//!
//! The pipeline itself is a pure function of its input; storing the
//! resulting messages is the caller's concern, behind this port.

use async_trait::async_trait;
use council_domain::{Conversation, ConversationSummary};
use thiserror::Error;

/// Errors from the conversation store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(String),

    #[error("Invalid conversation id: {0}")]
    InvalidId(String),

    #[error("Conversation file corrupt: {0}")]
    Corrupt(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable store of conversations, keyed by id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a new, empty conversation under the given id.
    async fn create(&self, id: &str) -> Result<Conversation, StoreError>;

    /// Load a conversation by id.
    async fn get(&self, id: &str) -> Result<Conversation, StoreError>;

    /// Metadata for every stored conversation, newest first.
    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError>;

    /// Persist the given conversation, replacing any previous state.
    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError>;

    /// Remove every stored conversation.
    async fn delete_all(&self) -> Result<(), StoreError>;
}
