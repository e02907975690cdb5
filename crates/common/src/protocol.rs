//! Request and response types exchanged between components.
//!
//! These types are serialised as JSON over the sidecar HTTP API. Peer
//! services embedding the codec directly can reuse them to keep their own
//! verification endpoints wire-compatible.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mint endpoint
// ---------------------------------------------------------------------------

/// Successful response body for `POST /mint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintResponse {
    /// Freshly minted access key, ready to be placed in the request header.
    pub access_key: String,
}

// ---------------------------------------------------------------------------
// Validate endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    /// The access key to introspect, exactly as it appeared in the header.
    pub access_key: String,
}

/// Response body for `POST /validate`.
///
/// `timestamp` and `age` are present only when the key decrypted far enough
/// for them to be recovered; `message` is present only on rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// Whether the key is genuine, matches the local secret, and is fresh.
    pub valid: bool,
    /// Unix seconds at which the key was minted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Seconds elapsed between mint and validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    /// Rejection reason, e.g. `"access key expired"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"unauthorized"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status; always `"ok"` once startup completed, since
    /// the secret is validated before the server binds.
    pub status: String,
    /// Number of distinct secrets with memoised key material.
    pub keys_cached: usize,
}
