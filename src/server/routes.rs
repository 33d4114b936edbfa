// src/server/routes.rs
// =============================================================================
// Request handlers for the JSON API.
//
//   GET  /api/health  -> { ok: true, service, at }
//   POST /api/check   -> CheckResponse with 200 / 400 / 504 / 502
//   *    /api/...     -> 404 { ok: false, error: "Not found." }
//
// The HTTP status for a failed check is chosen here, from the failure's
// classification. The checker itself knows nothing about HTTP status codes
// of its own responses.
// =============================================================================

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use super::AppState;
use crate::checker::{format_timestamp, CheckFailure, CheckRequest, CheckResponse, FailureKind};

pub const SERVICE_NAME: &str = "url-health-checker";
pub const INVALID_BODY: &str = "Request body must be a JSON object with a \"url\" string.";

// A failed check on its way out as an HTTP response
#[derive(Debug)]
pub struct CheckError(pub CheckFailure);

impl From<CheckFailure> for CheckError {
    fn from(failure: CheckFailure) -> Self {
        CheckError(failure)
    }
}

impl IntoResponse for CheckError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        (status, Json(CheckResponse::failure(&self.0))).into_response()
    }
}

// Validation -> 400, Timeout -> 504, Network -> 502
pub fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::Validation => StatusCode::BAD_REQUEST,
        FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        FailureKind::Network => StatusCode::BAD_GATEWAY,
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "at": format_timestamp(&Utc::now()),
    }))
}

// Runs one check
//
// A body that does not deserialize into CheckRequest (not JSON, wrong
// content type, url not a string, timeoutMs not a number) is reported as a
// validation failure so the response keeps the { ok, error } shape.
pub async fn check(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, CheckError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected check body");
        CheckFailure::validation(INVALID_BODY)
    })?;

    let result = state.checker.check(&request).await?;
    Ok(Json(CheckResponse::success(result)))
}

pub async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "ok": false, "error": "Not found." })),
    )
}
