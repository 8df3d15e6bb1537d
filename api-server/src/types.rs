use serde::{Deserialize, Serialize};

/// Body of `POST /api/scores`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreSubmission {
    #[serde(default)]
    pub(crate) player_name: String,
    #[serde(default)]
    pub(crate) score: Option<f64>,
    #[serde(default)]
    pub(crate) session_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl SubmitResponse {
    pub(crate) fn accepted() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    pub(crate) token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsResponse {
    pub(crate) subscriber_count: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) service: &'static str,
    pub(crate) leaderboard_backend: &'static str,
    pub(crate) leaderboard_limit: usize,
    pub(crate) anti_cheat_enabled: bool,
    pub(crate) stats_configured: bool,
}
