//! Append-only answer history (`chat_history` tree).

use async_trait::async_trait;

use crate::error::Result;
use crate::model::AnswerRecord;
use crate::store::{self, Store};

/// Most records returned by a history read.
pub const HISTORY_LIMIT: usize = 50;

/// Sink the pipeline persists finished answers to.
#[async_trait]
pub trait AnswerLog: Send + Sync {
    async fn append(&self, record: &AnswerRecord) -> Result<()>;
}

#[derive(Clone)]
pub struct ChatHistory {
    tree: sled::Tree,
}

impl ChatHistory {
    pub fn new(store: &Store) -> sled::Result<Self> {
        Ok(Self {
            tree: store.tree(store::CHAT_HISTORY)?,
        })
    }

    /// Newest first, at most `limit` (capped at [`HISTORY_LIMIT`]).
    pub async fn list_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<AnswerRecord>> {
        let tree = self.tree.clone();
        let user_id = user_id.to_string();
        let limit = limit.min(HISTORY_LIMIT);
        store::blocking(move || store::list_newest(&tree, &user_id, limit)).await
    }
}

#[async_trait]
impl AnswerLog for ChatHistory {
    async fn append(&self, record: &AnswerRecord) -> Result<()> {
        let tree = self.tree.clone();
        let key = store::timeline_key(&record.user_id, record.timestamp, &record.id);
        let value = store::encode(record)?;
        store::blocking(move || {
            tree.insert(key.as_bytes(), value)?;
            Ok(())
        })
        .await?;
        tracing::debug!(record_id = %record.id, user_id = %record.user_id, "answer recorded");
        Ok(())
    }
}
