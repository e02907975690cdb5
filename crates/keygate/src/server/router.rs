//! Axum router construction.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// `/check` sits behind [`middleware::require_access_key`]; the remaining
/// routes are open (the introspection endpoints must stay reachable for
/// callers holding rejected keys).
pub fn build(state: AppState) -> Router {
    let protected = Router::new()
        .route("/check", get(handlers::check))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_access_key,
        ));

    Router::new()
        .route("/mint", post(handlers::mint))
        .route("/validate", post(handlers::validate))
        .route("/health", get(handlers::health))
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}
