//! JSON-file conversation store.
//!
//! One pretty-printed JSON file per conversation under the data
//! directory. Ids are validated before any file operation: only
//! `[A-Za-z0-9_-]` ids are accepted, which rules out path traversal by
//! construction rather than by canonicalize-and-compare.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use council_application::{ConversationStore, StoreError};
use council_domain::{Conversation, ConversationSummary};
use std::path::{Path, PathBuf};
use tracing::warn;

/// File-per-conversation store rooted at a data directory.
pub struct JsonConversationStore {
    data_dir: PathBuf,
}

impl JsonConversationStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Resolve the file path for a conversation id.
    ///
    /// Rejects any id containing characters outside `[A-Za-z0-9_-]`, so
    /// the joined path cannot escape the data directory.
    fn safe_path(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.json", id)))
    }

    async fn ensure_data_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        Ok(())
    }

    async fn write(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let path = self.safe_path(&conversation.id)?;
        self.ensure_data_dir().await?;
        let json = serde_json::to_string_pretty(conversation)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for JsonConversationStore {
    async fn create(&self, id: &str) -> Result<Conversation, StoreError> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let conversation = Conversation::new(id, created_at);
        self.write(&conversation).await?;
        Ok(conversation)
    }

    async fn get(&self, id: &str) -> Result<Conversation, StoreError> {
        let path = self.safe_path(id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<Conversation>(&content) {
                Ok(conversation) => summaries.push(conversation.summary()),
                Err(e) => {
                    // One corrupt file must not hide the rest
                    warn!("Skipping corrupt conversation file {}: {}", path.display(), e);
                }
            }
        }

        // Newest first
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.write(conversation).await
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                tokio::fs::remove_file(path).await?;
            }
        }
        Ok(())
    }
}
