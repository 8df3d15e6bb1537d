//! Leaderboard gateway.
//!
//! The ranking lives in an external store. Writes go through the privileged
//! key; reads use the public key and never fail from the caller's point of
//! view: an absent or broken store reads as an empty board.

mod rest;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub(crate) use rest::RestStore;
pub(crate) use sqlite::SqliteStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeaderboardEntry {
    pub(crate) username: String,
    pub(crate) score: i64,
    #[serde(alias = "created_at")]
    pub(crate) created_at: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("leaderboard store is not configured")]
    NotConfigured,
    #[error("leaderboard request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("leaderboard store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to prepare sqlite store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("leaderboard store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub(crate) trait LeaderboardStore: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn insert(&self, username: &str, score: u32) -> Result<(), StoreError>;

    /// Best `limit` entries, highest score first.
    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
}

#[derive(Clone, Default)]
pub(crate) struct LeaderboardGateway {
    store: Option<Arc<dyn LeaderboardStore>>,
}

impl LeaderboardGateway {
    pub(crate) fn new(store: Arc<dyn LeaderboardStore>) -> Self {
        Self { store: Some(store) }
    }

    pub(crate) fn unconfigured() -> Self {
        Self { store: None }
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub(crate) fn backend(&self) -> &'static str {
        self.store.as_ref().map_or("none", |store| store.backend())
    }

    pub(crate) async fn submit(&self, username: &str, score: u32) -> Result<(), StoreError> {
        let store = self.store.as_ref().ok_or(StoreError::NotConfigured)?;
        store.insert(username, score).await
    }

    pub(crate) async fn fetch_top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let Some(store) = self.store.as_ref() else {
            return Vec::new();
        };
        match store.top(limit).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!(backend = store.backend(), "error fetching leaderboard: {err}");
                Vec::new()
            }
        }
    }
}
