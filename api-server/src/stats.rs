//! Channel statistics proxy with a time-based cache.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

pub(crate) const DEFAULT_YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, thiserror::Error)]
pub(crate) enum StatsError {
    #[error("API key or Channel ID missing")]
    MissingConfig,
    #[error("stats request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("stats API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no subscriber count found for channel {channel_id}")]
    MissingCount { channel_id: String },
}

#[derive(Debug, Clone)]
pub(crate) struct ChannelCredentials {
    pub(crate) api_key: String,
    pub(crate) channel_id: String,
}

#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    #[serde(default)]
    statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    #[serde(default)]
    subscriber_count: Option<String>,
}

fn subscriber_count(response: &ChannelsResponse) -> Option<u64> {
    response
        .items
        .first()?
        .statistics
        .as_ref()?
        .subscriber_count
        .as_deref()?
        .parse()
        .ok()
}

struct CachedCount {
    value: u64,
    fetched_at: Instant,
}

pub(crate) struct StatsProxy {
    client: Client,
    api_base: String,
    credentials: Option<ChannelCredentials>,
    ttl: Duration,
    cache: RwLock<Option<CachedCount>>,
}

impl StatsProxy {
    pub(crate) fn new(
        client: Client,
        api_base: &str,
        credentials: Option<ChannelCredentials>,
        ttl: Duration,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
            ttl,
            cache: RwLock::new(None),
        }
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Subscriber count, served from cache while it is younger than the TTL.
    /// Only successful lookups are cached. Refills happen under the write
    /// lock, so concurrent misses share one upstream call.
    pub(crate) async fn subscriber_count(&self) -> Result<u64, StatsError> {
        let credentials = self.credentials.as_ref().ok_or(StatsError::MissingConfig)?;

        if let Some(value) = self.fresh(self.cache.read().await.as_ref()) {
            return Ok(value);
        }

        let mut cache = self.cache.write().await;
        if let Some(value) = self.fresh(cache.as_ref()) {
            return Ok(value);
        }

        let value = self.fetch(credentials).await?;
        *cache = Some(CachedCount {
            value,
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    fn fresh(&self, cached: Option<&CachedCount>) -> Option<u64> {
        cached
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.value)
    }

    async fn fetch(&self, credentials: &ChannelCredentials) -> Result<u64, StatsError> {
        let response = self
            .client
            .get(format!("{}/channels", self.api_base))
            .query(&[
                ("part", "statistics"),
                ("id", credentials.channel_id.as_str()),
                ("key", credentials.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChannelsResponse = response.json().await?;
        tracing::debug!(items = payload.items.len(), "channel stats payload received");
        subscriber_count(&payload).ok_or_else(|| StatsError::MissingCount {
            channel_id: credentials.channel_id.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) async fn prime_cache(&self, value: u64) {
        *self.cache.write().await = Some(CachedCount {
            value,
            fetched_at: Instant::now(),
        });
    }
}
