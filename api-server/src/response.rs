use actix_web::{http::StatusCode, HttpResponse};

use crate::types::SubmitResponse;

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "error": message.into(),
    }))
}

/// Submission failures are values, not HTTP errors: the client always gets
/// a 200 with `success: false` so the game-over screen can show the reason.
pub(crate) fn submit_failure(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(SubmitResponse::failed(message))
}
