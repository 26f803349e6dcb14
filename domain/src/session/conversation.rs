//! Stored conversation entity.
//!
//! A conversation is a titled sequence of exchanges: each user message is
//! stored verbatim, each assistant turn stores the full three-stage
//! council output so past deliberations can be replayed. Per-conversation
//! model overrides are optional and fall back to global configuration.

use crate::core::model::ModelId;
use crate::council::results::{Stage1Response, Stage2Ranking, Stage3Synthesis};
use crate::session::entities::Message;
use serde::{Deserialize, Serialize};

/// One stored exchange in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ConversationMessage {
    User {
        content: String,
    },
    Assistant {
        stage1: Vec<Stage1Response>,
        stage2: Vec<Stage2Ranking>,
        stage3: Stage3Synthesis,
    },
}

/// A persisted conversation (Entity)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    /// RFC 3339 creation timestamp
    pub created_at: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council_models: Option<Vec<ModelId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chairman_model: Option<ModelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search_enabled: Option<bool>,
    pub messages: Vec<ConversationMessage>,
}

/// Default title before the first message generates one.
pub const DEFAULT_TITLE: &str = "New Conversation";

impl Conversation {
    pub fn new(id: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: created_at.into(),
            title: DEFAULT_TITLE.to_string(),
            council_models: None,
            chairman_model: None,
            web_search_enabled: None,
            messages: Vec::new(),
        }
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(ConversationMessage::User {
            content: content.into(),
        });
    }

    pub fn add_assistant_message(
        &mut self,
        stage1: Vec<Stage1Response>,
        stage2: Vec<Stage2Ranking>,
        stage3: Stage3Synthesis,
    ) {
        self.messages.push(ConversationMessage::Assistant {
            stage1,
            stage2,
            stage3,
        });
    }

    /// Flatten stored history into the message sequence sent to models.
    ///
    /// User messages pass through; each assistant turn contributes its
    /// final synthesis only (stage 1/2 artifacts are council-internal).
    pub fn context_messages(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|message| match message {
                ConversationMessage::User { content } => Message::user(content.clone()),
                ConversationMessage::Assistant { stage3, .. } => {
                    Message::assistant(stage3.response.clone())
                }
            })
            .collect()
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            created_at: self.created_at.clone(),
            title: self.title.clone(),
            message_count: self.messages.len(),
        }
    }
}

/// Conversation metadata for list views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub message_count: usize,
}
