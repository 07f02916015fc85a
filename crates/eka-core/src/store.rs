//! Sled-backed document store. One tree per collection: `users`, `users_by_email`,
//! `chat_history`, `job_cards`, `tickets`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::error::Result;

const DEFAULT_STORE_PATH: &str = "./data/eka";

pub const USERS: &str = "users";
pub const USERS_BY_EMAIL: &str = "users_by_email";
pub const CHAT_HISTORY: &str = "chat_history";
pub const JOB_CARDS: &str = "job_cards";
pub const TICKETS: &str = "tickets";

#[derive(Clone)]
pub struct Store {
    db: sled::Db,
}

impl Store {
    /// Open the store at the given path (default `./data/eka`).
    pub fn open(path: Option<impl AsRef<Path>>) -> sled::Result<Self> {
        let p = path
            .map(|x| x.as_ref().to_path_buf())
            .unwrap_or_else(|| Path::new(DEFAULT_STORE_PATH).to_path_buf());
        let db = sled::open(p)?;
        Ok(Self { db })
    }

    pub fn tree(&self, name: &str) -> sled::Result<sled::Tree> {
        self.db.open_tree(name)
    }

    pub async fn flush(&self) -> sled::Result<usize> {
        self.db.flush_async().await
    }
}

/// Key that sorts an owner's documents by creation time: `{owner}/{micros:020}/{id}`.
pub fn timeline_key(owner: &str, at: DateTime<Utc>, id: &str) -> String {
    format!("{}/{:020}/{}", owner, at.timestamp_micros(), id)
}

pub fn owner_prefix(owner: &str) -> String {
    format!("{}/", owner)
}

pub fn encode<T: Serialize>(doc: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(doc)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Newest-first documents under `owner`, at most `limit`.
pub fn list_newest<T: DeserializeOwned>(tree: &sled::Tree, owner: &str, limit: usize) -> Result<Vec<T>> {
    tree.scan_prefix(owner_prefix(owner).as_bytes())
        .rev()
        .take(limit)
        .map(|entry| {
            let (_, v) = entry?;
            decode(&v)
        })
        .collect()
}

/// Run sled/bcrypt work off the async workers.
pub async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}
