//! Axum request handlers for all service endpoints.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{
    ErrorResponse, HealthResponse, MintResponse, ValidateRequest, ValidateResponse,
};
use common::ServiceError;
use tracing::debug;

use access_key::Validation;

use super::state::AppState;

/// Current wall-clock time as unix seconds.
///
/// Read exactly once per request at the call boundary; the codec itself
/// takes `now` as an explicit parameter. A pre-epoch clock maps to zero, so
/// inbound keys then fail the age check instead of panicking.
pub(crate) fn unix_now() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(_) => 0,
    }
}

/// Render a [`ServiceError`] as its HTTP response.
pub(crate) fn error_response(err: &ServiceError) -> Response {
    let (code, message) = match err {
        ServiceError::BadRequest(m) => ("bad_request", m),
        ServiceError::Unauthorized(m) => ("unauthorized", m),
        ServiceError::Internal(m) => ("internal_error", m),
    };
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(code, message.clone()))).into_response()
}

fn to_validate_response(result: &Validation) -> ValidateResponse {
    ValidateResponse {
        valid: result.is_valid(),
        timestamp: result.timestamp(),
        age: result.age(),
        message: result.message(),
    }
}

/// `POST /mint` — mint a fresh access key for the configured secret.
///
/// Intended for co-located processes without a crypto stack; expose on
/// loopback only. Services that hold the secret should mint in-process via
/// the `access-key` crate instead of making a network hop.
pub async fn mint(State(state): State<AppState>) -> Response {
    let keys = state.keys.derive(&state.secret);
    let access_key = access_key::mint_with(&keys, &state.secret, unix_now());
    (StatusCode::OK, Json(MintResponse { access_key })).into_response()
}

/// `POST /validate` — introspect an access key.
///
/// Always answers `200` with the full verdict; forward-auth callers decide
/// what to do with a rejection and want the reason for their own logs.
pub async fn validate(State(state): State<AppState>, Json(req): Json<ValidateRequest>) -> Response {
    let keys = state.keys.derive(&state.secret);
    let result = access_key::validate_with(
        &keys,
        &req.access_key,
        &state.secret,
        unix_now(),
        state.max_age_secs,
    );
    if let Some(message) = result.message() {
        debug!(reason = %message, "access key introspection rejected");
    }
    (StatusCode::OK, Json(to_validate_response(&result))).into_response()
}

/// `GET /check` — forward-auth endpoint.
///
/// Reachable only through the `require_access_key` middleware, so arriving
/// here means the header validated; reverse proxies treat the `204` as
/// "allow".
pub async fn check() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// `GET /health` — liveness check.
///
/// The secret is validated before the server binds, so this always reports
/// `ok` once the process is up.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        keys_cached: state.keys.len(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}
