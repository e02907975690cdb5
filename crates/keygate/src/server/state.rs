//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use access_key::KeyCache;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed)
/// so that Axum can clone the state for each request without copying
/// expensive data.
#[derive(Clone)]
pub struct AppState {
    /// The fleet-wide shared secret, verbatim as configured (a `base64:`
    /// prefix, if any, is handled by the codec).
    pub secret: Arc<String>,
    /// Name of the HTTP header carrying the access key.
    pub header_name: Arc<String>,
    /// Maximum accepted key age in seconds.
    pub max_age_secs: i64,
    /// Memoised key material per secret.
    pub keys: KeyCache,
}

impl AppState {
    /// Create a new [`AppState`] and warm the key cache for `secret`.
    pub fn new(secret: String, header_name: String, max_age_secs: i64) -> Self {
        let keys = KeyCache::new();
        keys.derive(&secret);
        Self {
            secret: Arc::new(secret),
            header_name: Arc::new(header_name),
            max_age_secs,
            keys,
        }
    }
}
