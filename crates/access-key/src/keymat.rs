//! Cipher key and IV derivation from the shared secret.
//!
//! The derivation is deliberately unusual: the key and IV are the **ASCII
//! bytes of the hex digest**, not the digest bytes themselves. This is the
//! agreed cross-service contract — every peer derives the same material the
//! same way — so it must be replicated verbatim, not improved.
//!
//! Because the IV depends only on the secret, every message encrypted under
//! one secret shares the same IV. That is a known CBC weakness (no semantic
//! security across messages); changing it requires a coordinated protocol
//! version bump across the whole fleet, not a local fix.

use sha2::{Digest, Sha256};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-CBC initialisation vector (one cipher block).
pub const IV_LEN: usize = 16;

/// Literal prefix some deployments carry on their configured secret.
///
/// The prefix is stripped before hashing; the remainder is treated as raw
/// text and is **not** base64-decoded.
pub const SECRET_PREFIX: &str = "base64:";

/// Derived cipher parameters for one shared secret.
///
/// Cloned into call stacks where needed. When this type is dropped, the
/// memory is overwritten with zeroes to minimise the window during which
/// key material lives in RAM.
#[derive(Clone)]
pub struct KeyMaterial {
    /// AES-256 key: ASCII bytes of the first 32 hex characters.
    pub key: [u8; KEY_LEN],
    /// CBC IV: ASCII bytes of the first 16 hex characters.
    pub iv: [u8; IV_LEN],
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.key.iter_mut().for_each(|b| *b = 0);
        self.iv.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("KeyMaterial([REDACTED])")
    }
}

/// Derive the [`KeyMaterial`] for `secret`.
///
/// Pure and deterministic: the same secret always yields the same key and
/// IV, with no per-message randomness. Steps:
///
/// 1. Strip a leading `base64:` literal if present.
/// 2. `hash_hex = lowercase hex of SHA-256(secret bytes)` (64 characters).
/// 3. Key = ASCII bytes of `hash_hex[..32]`, IV = ASCII bytes of
///    `hash_hex[..16]`.
pub fn derive(secret: &str) -> KeyMaterial {
    let stripped = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
    let hash_hex = hex::encode(Sha256::digest(stripped.as_bytes()));

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&hash_hex.as_bytes()[..KEY_LEN]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&hash_hex.as_bytes()[..IV_LEN]);
    KeyMaterial { key, iv }
}
