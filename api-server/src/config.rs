use std::{env, path::PathBuf, sync::Arc, time::Duration};

use drift_core::constants::LEADERBOARD_SIZE;

use crate::leaderboard::{LeaderboardGateway, RestStore, SqliteStore};
use crate::session::SessionKey;
use crate::stats::{ChannelCredentials, StatsProxy, DEFAULT_YOUTUBE_API_BASE};

pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub(crate) const DEFAULT_STATS_CACHE_SECS: u64 = 60 * 60;
pub(crate) const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub(crate) const DEFAULT_JSON_LIMIT_BYTES: usize = 16 * 1024;

/// Everything the server reads from its environment.
#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) bind_addr: String,
    pub(crate) store_url: Option<String>,
    pub(crate) store_read_key: Option<String>,
    /// Privileged write key; doubles as the session HMAC secret.
    pub(crate) store_write_key: Option<String>,
    pub(crate) sqlite_path: Option<PathBuf>,
    pub(crate) youtube_api_key: Option<String>,
    pub(crate) youtube_channel_id: Option<String>,
    pub(crate) youtube_api_base: String,
    pub(crate) leaderboard_limit: usize,
    pub(crate) stats_cache_secs: u64,
    pub(crate) http_timeout_secs: u64,
    pub(crate) json_limit_bytes: usize,
}

impl ServerConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            bind_addr: env::var("API_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            store_url: read_env_string("NEXT_PUBLIC_SUPABASE_URL"),
            store_read_key: read_env_string("NEXT_PUBLIC_SUPABASE_ANON_KEY"),
            store_write_key: read_env_string("SUPABASE_SERVICE_ROLE_KEY"),
            sqlite_path: read_env_string("LEADERBOARD_SQLITE_PATH").map(PathBuf::from),
            youtube_api_key: read_env_string("YOUTUBE_API_KEY"),
            youtube_channel_id: read_env_string("YOUTUBE_CHANNEL_ID"),
            youtube_api_base: read_env_string("YOUTUBE_API_BASE")
                .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE.to_string()),
            leaderboard_limit: cap_leaderboard_limit(read_env_usize(
                "LEADERBOARD_LIMIT",
                LEADERBOARD_SIZE,
            )),
            stats_cache_secs: read_env_u64("STATS_CACHE_SECS", DEFAULT_STATS_CACHE_SECS),
            http_timeout_secs: read_env_u64("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            json_limit_bytes: read_env_usize("JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT_BYTES),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) session_key: Option<Arc<SessionKey>>,
    pub(crate) leaderboard: LeaderboardGateway,
    pub(crate) stats: Arc<StatsProxy>,
    pub(crate) leaderboard_limit: usize,
}

impl AppState {
    /// Builds the shared state. Missing or broken collaborators are logged
    /// and left out; the server still starts and degrades per endpoint.
    pub(crate) fn from_config(config: &ServerConfig) -> Self {
        let timeout = Duration::from_secs(config.http_timeout_secs);

        let session_key = match config.store_write_key.as_deref().map(str::as_bytes) {
            Some(secret) => match SessionKey::new(secret) {
                Ok(key) => Some(Arc::new(key)),
                Err(err) => {
                    tracing::error!("session key unusable: {err}");
                    None
                }
            },
            None => {
                tracing::warn!("SUPABASE_SERVICE_ROLE_KEY not set: sessions and score submission disabled");
                None
            }
        };

        let leaderboard = build_leaderboard(config, timeout);

        let credentials = match (&config.youtube_api_key, &config.youtube_channel_id) {
            (Some(api_key), Some(channel_id)) => Some(ChannelCredentials {
                api_key: api_key.clone(),
                channel_id: channel_id.clone(),
            }),
            _ => None,
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("falling back to default http client: {err}");
                reqwest::Client::new()
            });
        let stats = StatsProxy::new(
            client,
            &config.youtube_api_base,
            credentials,
            Duration::from_secs(config.stats_cache_secs),
        );

        Self {
            session_key,
            leaderboard,
            stats: Arc::new(stats),
            leaderboard_limit: config.leaderboard_limit,
        }
    }
}

fn build_leaderboard(config: &ServerConfig, timeout: Duration) -> LeaderboardGateway {
    if let Some(path) = &config.sqlite_path {
        return match SqliteStore::open(path) {
            Ok(store) => {
                tracing::info!(path = %path.display(), "using sqlite leaderboard");
                LeaderboardGateway::new(Arc::new(store))
            }
            Err(err) => {
                tracing::error!("failed to open sqlite leaderboard: {err}");
                LeaderboardGateway::unconfigured()
            }
        };
    }

    let (Some(url), Some(read_key)) = (&config.store_url, &config.store_read_key) else {
        tracing::warn!("leaderboard store not configured: reads return empty boards");
        return LeaderboardGateway::unconfigured();
    };

    match RestStore::new(url, read_key.clone(), config.store_write_key.clone(), timeout) {
        Ok(store) => LeaderboardGateway::new(Arc::new(store)),
        Err(err) => {
            tracing::error!("failed to build leaderboard client: {err}");
            LeaderboardGateway::unconfigured()
        }
    }
}

/// The board never shows more than [`LEADERBOARD_SIZE`] rows.
pub(crate) fn cap_leaderboard_limit(limit: usize) -> usize {
    if limit > LEADERBOARD_SIZE {
        tracing::warn!(
            requested = limit,
            max = LEADERBOARD_SIZE,
            "LEADERBOARD_LIMIT above maximum, capping"
        );
        return LEADERBOARD_SIZE;
    }
    limit
}

pub(crate) fn read_env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_limit_is_capped_at_board_size() {
        assert_eq!(cap_leaderboard_limit(25), LEADERBOARD_SIZE);
        assert_eq!(cap_leaderboard_limit(LEADERBOARD_SIZE), LEADERBOARD_SIZE);
        assert_eq!(cap_leaderboard_limit(3), 3);
    }
}
