use actix_web::{
    http::StatusCode,
    web::{Data, Json},
    HttpResponse, Responder,
};

use crate::config::AppState;
use crate::response::{json_error, submit_failure};
use crate::session::now_unix_ms;
use crate::stats::StatsError;
use crate::types::{
    HealthResponse, ScoreSubmission, SessionResponse, StatsResponse, SubmitResponse,
};
use crate::validate::{validate_submission, MSG_SERVER_MISCONFIGURED, MSG_STORE_WRITE_FAILED};

pub(crate) async fn health(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "quantum-drift-api",
        leaderboard_backend: state.leaderboard.backend(),
        leaderboard_limit: state.leaderboard_limit,
        anti_cheat_enabled: state.session_key.is_some(),
        stats_configured: state.stats.is_configured(),
    })
}

/// Issues a signed start-of-game token, or `null` when the server has no
/// secret to sign with.
pub(crate) async fn start_session(state: Data<AppState>) -> impl Responder {
    let token = state
        .session_key
        .as_ref()
        .map(|key| key.issue().to_string());
    if token.is_none() {
        tracing::warn!("session requested but no session secret is configured");
    }
    HttpResponse::Ok().json(SessionResponse { token })
}

pub(crate) async fn submit_score(
    state: Data<AppState>,
    body: Json<ScoreSubmission>,
) -> impl Responder {
    let submission = body.into_inner();

    let Some(key) = state.session_key.as_deref() else {
        tracing::error!("score submission refused: session secret missing");
        return submit_failure(MSG_SERVER_MISCONFIGURED);
    };
    if !state.leaderboard.is_configured() {
        tracing::error!("score submission refused: leaderboard store missing");
        return submit_failure(MSG_SERVER_MISCONFIGURED);
    }

    let score = match validate_submission(
        key,
        &submission.player_name,
        submission.score.unwrap_or(f64::NAN),
        submission.session_token.as_deref(),
        now_unix_ms(),
    ) {
        Ok(score) => score,
        Err(rejection) => {
            if !rejection.is_cheat_signal() {
                tracing::debug!(reason = ?rejection, "score submission rejected");
            }
            return submit_failure(rejection.to_string());
        }
    };

    match state.leaderboard.submit(&submission.player_name, score).await {
        Ok(()) => {
            tracing::info!(player = %submission.player_name, score, "score recorded");
            HttpResponse::Ok().json(SubmitResponse::accepted())
        }
        Err(err) => {
            tracing::error!(player = %submission.player_name, score, "error submitting score: {err}");
            submit_failure(MSG_STORE_WRITE_FAILED)
        }
    }
}

pub(crate) async fn leaderboard(state: Data<AppState>) -> impl Responder {
    let entries = state.leaderboard.fetch_top(state.leaderboard_limit).await;
    HttpResponse::Ok().json(entries)
}

pub(crate) async fn channel_stats(state: Data<AppState>) -> impl Responder {
    match state.stats.subscriber_count().await {
        Ok(subscriber_count) => HttpResponse::Ok().json(StatsResponse { subscriber_count }),
        Err(StatsError::MissingConfig) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            StatsError::MissingConfig.to_string(),
        ),
        Err(err) => {
            tracing::error!("error fetching channel stats: {err}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch stats")
        }
    }
}
