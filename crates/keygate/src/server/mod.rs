//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Validate the access-key header in front of protected routes.
//! - Inject shared application state ([`state::AppState`]) into handlers.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
