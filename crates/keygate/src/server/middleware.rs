//! Axum middleware layers applied to the router.
//!
//! [`require_access_key`] is the service-side guard: it validates the
//! configured access-key header and rejects the request with `401` before
//! the inner handler runs. Peer services embedding the codec are expected
//! to mount an equivalent layer in front of their own routes.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use common::ServiceError;
use tracing::warn;

use super::handlers::{error_response, unix_now};
use super::state::AppState;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reject any request whose access-key header is missing, malformed, minted
/// under a different secret, or older than the configured maximum age.
pub async fn require_access_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let header = state.header_name.as_str();
    let token = match req.headers().get(header) {
        Some(value) => match value.to_str() {
            Ok(s) => s,
            Err(_) => {
                return error_response(&ServiceError::Unauthorized(format!(
                    "{header} header contains non-ASCII characters"
                )));
            }
        },
        None => {
            return error_response(&ServiceError::Unauthorized(format!(
                "missing {header} header"
            )));
        }
    };

    let keys = state.keys.derive(&state.secret);
    let result =
        access_key::validate_with(&keys, token, &state.secret, unix_now(), state.max_age_secs);
    match result.message() {
        None => next.run(req).await,
        Some(message) => {
            warn!(reason = %message, "access key rejected");
            error_response(&ServiceError::Unauthorized(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{body::Body, http::Request, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    const SECRET: &str = "secret";

    fn guarded_router(state: AppState) -> Router {
        Router::new()
            .route("/protected", get(|| async { StatusCode::NO_CONTENT }))
            .route_layer(from_fn_with_state(state.clone(), require_access_key))
            .with_state(state)
    }

    fn test_state() -> AppState {
        AppState::new(SECRET.into(), "Access-Key".into(), 3600)
    }

    async fn status_for(headers: &[(&str, &str)]) -> StatusCode {
        let app = guarded_router(test_state());
        let mut builder = Request::builder().uri("/protected");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let resp = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        resp.status()
    }

    #[tokio::test]
    async fn missing_header_is_401() {
        assert_eq!(status_for(&[]).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_header_is_401() {
        assert_eq!(
            status_for(&[("Access-Key", "not-a-key")]).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn fresh_key_passes_through() {
        let token = access_key::mint(SECRET, unix_now());
        assert_eq!(
            status_for(&[("Access-Key", token.as_str())]).await,
            StatusCode::NO_CONTENT
        );
    }

    #[tokio::test]
    async fn expired_key_is_401() {
        let token = access_key::mint(SECRET, unix_now() - 7200);
        assert_eq!(
            status_for(&[("Access-Key", token.as_str())]).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn key_under_other_secret_is_401() {
        let token = access_key::mint("other", unix_now());
        assert_eq!(
            status_for(&[("Access-Key", token.as_str())]).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
