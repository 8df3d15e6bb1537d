mod config;
mod handlers;
mod leaderboard;
mod response;
mod session;
mod stats;
mod types;
mod validate;

use actix_cors::Cors;
use actix_web::{error::InternalError, middleware, web, App, HttpServer};

use crate::config::{AppState, ServerConfig};
use crate::types::SubmitResponse;
use crate::validate::MSG_STORE_WRITE_FAILED;

pub(crate) fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health))
        .route("/api/session", web::post().to(handlers::start_session))
        .route("/api/scores", web::post().to(handlers::submit_score))
        .route("/api/leaderboard", web::get().to(handlers::leaderboard))
        .route("/api/youtube", web::get().to(handlers::channel_stats));
}

/// Malformed JSON still gets the `{ success, error }` shape the client expects.
pub(crate) fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            tracing::debug!("rejected request body: {err}");
            let response = actix_web::HttpResponse::BadRequest()
                .json(SubmitResponse::failed(MSG_STORE_WRITE_FAILED));
            InternalError::from_response(err, response).into()
        })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("failed to load .env: {err}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let state = AppState::from_config(&config);

    tracing::info!(
        bind_addr = %config.bind_addr,
        leaderboard_backend = state.leaderboard.backend(),
        anti_cheat = state.session_key.is_some(),
        stats = state.stats.is_configured(),
        "starting quantum drift api"
    );

    let json_limit = config.json_limit_bytes;
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config(json_limit))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::config::DEFAULT_JSON_LIMIT_BYTES;
    use crate::leaderboard::{LeaderboardGateway, RestStore, SqliteStore};
    use crate::session::{now_unix_ms, SessionKey};
    use crate::stats::{ChannelCredentials, StatsProxy, DEFAULT_YOUTUBE_API_BASE};
    use actix_web::{http::StatusCode, test as awtest, App};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    const SECRET: &[u8] = b"service-role-secret";

    fn unconfigured_stats() -> Arc<StatsProxy> {
        Arc::new(StatsProxy::new(
            reqwest::Client::new(),
            DEFAULT_YOUTUBE_API_BASE,
            None,
            Duration::from_secs(3600),
        ))
    }

    fn sqlite_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("scores.db")).unwrap();
        let state = AppState {
            session_key: Some(Arc::new(SessionKey::new(SECRET).unwrap())),
            leaderboard: LeaderboardGateway::new(Arc::new(store)),
            stats: unconfigured_stats(),
            leaderboard_limit: 10,
        };
        (state, dir)
    }

    fn bare_state() -> AppState {
        AppState {
            session_key: None,
            leaderboard: LeaderboardGateway::unconfigured(),
            stats: unconfigured_stats(),
            leaderboard_limit: 10,
        }
    }

    macro_rules! app {
        ($state:expr) => {
            awtest::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .app_data(json_config(DEFAULT_JSON_LIMIT_BYTES))
                    .configure(routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn low_score_is_recorded_and_listed() {
        let (state, _dir) = sqlite_state();
        let app = app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/scores")
            .set_json(json!({ "playerName": "nova", "score": 420.7 }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true }));

        let req = awtest::TestRequest::get().uri("/api/leaderboard").to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["username"], "nova");
        assert_eq!(body[0]["score"], 420);
        assert!(body[0]["createdAt"].is_string());
    }

    #[actix_web::test]
    async fn high_score_without_session_is_refused() {
        let (state, _dir) = sqlite_state();
        let app = app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/scores")
            .set_json(json!({ "playerName": "nova", "score": 10_000 }))
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Session invalide (anti-cheat)");
    }

    #[actix_web::test]
    async fn fresh_session_token_is_too_early_for_high_score() {
        let (state, _dir) = sqlite_state();
        let app = app!(state);

        let req = awtest::TestRequest::post().uri("/api/session").to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        let token = body["token"].as_str().unwrap().to_string();
        let (millis, _) = token.split_once(':').unwrap();
        let issued: u64 = millis.parse().unwrap();
        assert!(issued <= now_unix_ms());

        let req = awtest::TestRequest::post()
            .uri("/api/scores")
            .set_json(json!({ "playerName": "nova", "score": 50_000, "sessionToken": token }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"], "Anomalie temporelle détectée");
    }

    #[actix_web::test]
    async fn aged_session_token_allows_plausible_high_score() {
        let (state, _dir) = sqlite_state();
        let key = SessionKey::new(SECRET).unwrap();
        let token = key.issue_at(now_unix_ms() - 120_000).to_string();
        let app = app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/scores")
            .set_json(json!({ "playerName": "nova", "score": 12_000, "sessionToken": token }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "success": true }));
    }

    #[actix_web::test]
    async fn invalid_name_is_refused() {
        let (state, _dir) = sqlite_state();
        let app = app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/scores")
            .set_json(json!({ "playerName": "x".repeat(16), "score": 10 }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"], "Pseudo invalide (max 15 chars)");
    }

    #[actix_web::test]
    async fn missing_secret_fails_closed() {
        let app = app!(bare_state());

        let req = awtest::TestRequest::post()
            .uri("/api/scores")
            .set_json(json!({ "playerName": "nova", "score": 10 }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Configuration serveur manquante");

        let req = awtest::TestRequest::post().uri("/api/session").to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert!(body["token"].is_null());
    }

    #[actix_web::test]
    async fn leaderboard_without_store_is_empty() {
        let app = app!(bare_state());
        let req = awtest::TestRequest::get().uri("/api/leaderboard").to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn leaderboard_with_unreachable_store_is_empty() {
        let store = RestStore::new(
            "http://127.0.0.1:9",
            "anon".to_string(),
            None,
            Duration::from_secs(2),
        )
        .unwrap();
        let state = AppState {
            leaderboard: LeaderboardGateway::new(Arc::new(store)),
            ..bare_state()
        };
        let app = app!(state);

        let req = awtest::TestRequest::get().uri("/api/leaderboard").to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn unreachable_store_write_reports_generic_failure() {
        let store = RestStore::new(
            "http://127.0.0.1:9",
            "anon".to_string(),
            Some("service".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();
        let state = AppState {
            session_key: Some(Arc::new(SessionKey::new(SECRET).unwrap())),
            leaderboard: LeaderboardGateway::new(Arc::new(store)),
            ..bare_state()
        };
        let app = app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/scores")
            .set_json(json!({ "playerName": "nova", "score": 10 }))
            .to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["error"], "Erreur lors de l'envoi du score");
    }

    #[actix_web::test]
    async fn stats_without_credentials_is_server_error() {
        let app = app!(bare_state());
        let req = awtest::TestRequest::get().uri("/api/youtube").to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["error"], "API key or Channel ID missing");
    }

    fn unreachable_stats() -> Arc<StatsProxy> {
        Arc::new(StatsProxy::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            Some(ChannelCredentials {
                api_key: "key".to_string(),
                channel_id: "UC123".to_string(),
            }),
            Duration::from_secs(3600),
        ))
    }

    #[actix_web::test]
    async fn stats_upstream_failure_is_generic_server_error() {
        let state = AppState {
            stats: unreachable_stats(),
            ..bare_state()
        };
        let app = app!(state);

        let req = awtest::TestRequest::get().uri("/api/youtube").to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Failed to fetch stats" }));
    }

    #[actix_web::test]
    async fn cached_stats_are_served_without_upstream() {
        let stats = unreachable_stats();
        stats.prime_cache(77).await;
        let state = AppState {
            stats,
            ..bare_state()
        };
        let app = app!(state);

        let req = awtest::TestRequest::get().uri("/api/youtube").to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body, json!({ "subscriberCount": 77 }));
    }

    #[actix_web::test]
    async fn malformed_body_is_bad_request() {
        let (state, _dir) = sqlite_state();
        let app = app!(state);

        let req = awtest::TestRequest::post()
            .uri("/api/scores")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = awtest::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = awtest::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn health_reports_configuration() {
        let (state, _dir) = sqlite_state();
        let app = app!(state);
        let req = awtest::TestRequest::get().uri("/health").to_request();
        let body: Value = awtest::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["leaderboard_backend"], "sqlite");
        assert_eq!(body["anti_cheat_enabled"], true);
        assert_eq!(body["stats_configured"], false);
    }
}
