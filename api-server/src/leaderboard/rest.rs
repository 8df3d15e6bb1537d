use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;

use super::{LeaderboardEntry, LeaderboardStore, StoreError};

const SCORES_TABLE: &str = "scores";

/// Hosted PostgREST store (Supabase). Reads use the public key, which is
/// subject to row-level security; inserts use the service key, which is not.
pub(crate) struct RestStore {
    client: Client,
    base_url: String,
    read_key: String,
    write_key: Option<String>,
}

#[derive(Serialize)]
struct NewScore<'a> {
    username: &'a str,
    score: u32,
}

impl RestStore {
    pub(crate) fn new(
        base_url: &str,
        read_key: String,
        write_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            read_key,
            write_key,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{SCORES_TABLE}", self.base_url)
    }

    fn authorize(request: RequestBuilder, key: &str) -> RequestBuilder {
        request
            .header("apikey", key)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {key}"))
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl LeaderboardStore for RestStore {
    fn backend(&self) -> &'static str {
        "rest"
    }

    async fn insert(&self, username: &str, score: u32) -> Result<(), StoreError> {
        let key = self.write_key.as_deref().ok_or(StoreError::NotConfigured)?;
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=minimal")
            .json(&[NewScore { username, score }]);
        let response = Self::authorize(request, key).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let limit = limit.to_string();
        let request = self.client.get(self.table_url()).query(&[
            ("select", "username,score,created_at"),
            ("order", "score.desc"),
            ("limit", limit.as_str()),
        ]);
        let response = Self::authorize(request, &self.read_key).send().await?;
        let entries = Self::check(response)
            .await?
            .json::<Option<Vec<LeaderboardEntry>>>()
            .await?;
        Ok(entries.unwrap_or_default())
    }
}
