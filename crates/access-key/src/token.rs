//! Minting and validation of the `Access-Key` header value.
//!
//! A key carries the claim `<secret>@<unix-seconds>`, PHP-serialized,
//! AES-256-CBC encrypted, then base64-encoded **twice** — the second pass
//! encodes the text of the first, not the raw ciphertext. Both quirks are
//! load-bearing: peer services decode in exactly this order.
//!
//! Minting is infallible (its inputs are locally controlled); validation
//! never panics and never returns an `Err` — an invalid key is expected,
//! frequent input (stale or malicious clients) and is reported as a
//! [`Validation`] value so a single bad header cannot take down a request
//! handler.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::cipher;
use crate::keymat::{self, KeyMaterial};
use crate::phpstr;

/// Default maximum accepted key age, in seconds.
pub const DEFAULT_MAX_AGE_SECS: i64 = 3600;

/// Why a key was rejected.
///
/// The `Display` strings are part of the cross-service contract: peers log
/// and compare them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Base64 or cipher layer failed — forged, corrupted, or minted under
    /// an unknown secret.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The decrypted claim did not split into exactly `secret@timestamp`.
    #[error("invalid access key format")]
    MalformedClaim,

    /// The claim's second half is not an integer timestamp.
    #[error("invalid timestamp")]
    BadTimestamp,

    /// The claim's secret differs from the validator's configured secret.
    #[error("key mismatch")]
    SecretMismatch,

    /// The key is older than the caller's maximum age.
    #[error("access key expired")]
    Expired,
}

/// Outcome of validating an access key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The key decrypted, matched the local secret, and is fresh.
    Valid {
        /// Unix seconds at which the key was minted.
        timestamp: i64,
        /// `now - timestamp`; zero or negative for just-minted keys.
        age: i64,
    },
    /// The key was rejected. `timestamp` and `age` are populated only when
    /// the claim got far enough for them to be recovered (expiry).
    Invalid {
        reason: RejectReason,
        timestamp: Option<i64>,
        age: Option<i64>,
    },
}

impl Validation {
    /// `true` for [`Validation::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid { .. })
    }

    /// The embedded mint timestamp, when it could be recovered.
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Validation::Valid { timestamp, .. } => Some(*timestamp),
            Validation::Invalid { timestamp, .. } => *timestamp,
        }
    }

    /// The key's age at validation time, when it could be computed.
    pub fn age(&self) -> Option<i64> {
        match self {
            Validation::Valid { age, .. } => Some(*age),
            Validation::Invalid { age, .. } => *age,
        }
    }

    /// The rejection message, `None` for valid keys.
    pub fn message(&self) -> Option<String> {
        match self {
            Validation::Valid { .. } => None,
            Validation::Invalid { reason, .. } => Some(reason.to_string()),
        }
    }

    fn rejected(reason: RejectReason) -> Self {
        Validation::Invalid {
            reason,
            timestamp: None,
            age: None,
        }
    }
}

/// Mint an access key for `secret` at time `now` (unix seconds).
///
/// Deriving key material on every call is cheap but not free; callers on a
/// hot path can hold a [`KeyCache`](crate::cache::KeyCache) and use
/// [`mint_with`].
pub fn mint(secret: &str, now: i64) -> String {
    mint_with(&keymat::derive(secret), secret, now)
}

/// Mint an access key using already-derived `keys` for `secret`.
///
/// `keys` must be the material derived from `secret`; pairing it with a
/// different secret produces a key no validator will accept.
pub fn mint_with(keys: &KeyMaterial, secret: &str, now: i64) -> String {
    let payload = phpstr::serialize(&format!("{secret}@{now}"));
    let cipher_bytes = cipher::encrypt(keys, payload.as_bytes());
    let once = STANDARD.encode(&cipher_bytes);
    STANDARD.encode(once.as_bytes())
}

/// Validate `token` against `secret` at time `now`, accepting keys up to
/// `max_age` seconds old.
pub fn validate(token: &str, secret: &str, now: i64, max_age: i64) -> Validation {
    validate_with(&keymat::derive(secret), token, secret, now, max_age)
}

/// Validate `token` using already-derived `keys` for `secret`.
///
/// Runs the full chain in reverse: outer base64, inner base64, decrypt,
/// deserialize (falling back to the raw text for payloads that were never
/// PHP-serialized), then the claim and freshness checks. Never panics.
pub fn validate_with(
    keys: &KeyMaterial,
    token: &str,
    secret: &str,
    now: i64,
    max_age: i64,
) -> Validation {
    // Outer base64 layer: must decode to the ASCII text of the inner layer.
    let decoded_once = match STANDARD.decode(token) {
        Ok(bytes) => bytes,
        Err(_) => return Validation::rejected(RejectReason::DecryptionFailed),
    };
    let decoded_once = match String::from_utf8(decoded_once) {
        Ok(text) => text,
        Err(_) => return Validation::rejected(RejectReason::DecryptionFailed),
    };

    // Inner base64 layer: the raw ciphertext.
    let cipher_bytes = match STANDARD.decode(decoded_once.as_bytes()) {
        Ok(bytes) => bytes,
        Err(_) => return Validation::rejected(RejectReason::DecryptionFailed),
    };

    let plain_bytes = match cipher::decrypt(keys, &cipher_bytes) {
        Ok(bytes) => bytes,
        Err(_) => return Validation::rejected(RejectReason::DecryptionFailed),
    };
    // Wrong-key decryptions that survive the padding check almost never
    // survive this one.
    let text = match String::from_utf8(plain_bytes) {
        Ok(text) => text,
        Err(_) => return Validation::rejected(RejectReason::DecryptionFailed),
    };

    // Payloads from peers that skip the PHP serialization are accepted
    // verbatim.
    let value = phpstr::deserialize(&text).unwrap_or(text);

    let parts: Vec<&str> = value.split('@').collect();
    if parts.len() != 2 {
        return Validation::rejected(RejectReason::MalformedClaim);
    }
    let timestamp: i64 = match parts[1].parse() {
        Ok(t) => t,
        Err(_) => return Validation::rejected(RejectReason::BadTimestamp),
    };
    if parts[0] != secret {
        return Validation::rejected(RejectReason::SecretMismatch);
    }

    let age = now - timestamp;
    if age > max_age {
        return Validation::Invalid {
            reason: RejectReason::Expired,
            timestamp: Some(timestamp),
            age: Some(age),
        };
    }
    Validation::Valid { timestamp, age }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "secret";
    const T: i64 = 1_700_000_000;

    /// Encrypt and double-encode an arbitrary claim string, bypassing
    /// [`mint`]'s claim construction.
    fn encode_value(value: &str, secret: &str, serialize: bool) -> String {
        let payload = if serialize {
            phpstr::serialize(value)
        } else {
            value.to_owned()
        };
        let cipher_bytes = cipher::encrypt(&keymat::derive(secret), payload.as_bytes());
        let once = STANDARD.encode(&cipher_bytes);
        STANDARD.encode(once.as_bytes())
    }

    #[test]
    fn fresh_key_validates() {
        let token = mint(SECRET, T);
        assert_eq!(
            validate(&token, SECRET, T, DEFAULT_MAX_AGE_SECS),
            Validation::Valid {
                timestamp: T,
                age: 0
            }
        );
    }

    #[test]
    fn minting_is_deterministic() {
        assert_eq!(mint(SECRET, T), mint(SECRET, T));
    }

    #[test]
    fn token_is_base64_of_base64_of_blocks() {
        let token = mint(SECRET, T);
        let once = STANDARD.decode(&token).unwrap();
        let once = String::from_utf8(once).unwrap();
        let cipher_bytes = STANDARD.decode(once.as_bytes()).unwrap();
        assert!(!cipher_bytes.is_empty());
        assert_eq!(cipher_bytes.len() % 16, 0);
    }

    #[test]
    fn age_at_max_age_is_accepted() {
        let token = mint(SECRET, T);
        let result = validate(&token, SECRET, T + 60, 60);
        assert_eq!(
            result,
            Validation::Valid {
                timestamp: T,
                age: 60
            }
        );
    }

    #[test]
    fn age_past_max_age_is_expired() {
        let token = mint(SECRET, T);
        let result = validate(&token, SECRET, T + 61, 60);
        assert!(!result.is_valid());
        assert_eq!(result.message().unwrap(), "access key expired");
        // Expiry is the one rejection that still reports timestamp and age.
        assert_eq!(result.timestamp(), Some(T));
        assert_eq!(result.age(), Some(61));
    }

    #[test]
    fn future_dated_key_is_accepted() {
        // Clock skew between services mints keys slightly in the future;
        // only the upper age bound is checked.
        let token = mint(SECRET, T + 100);
        let result = validate(&token, SECRET, T, DEFAULT_MAX_AGE_SECS);
        assert_eq!(
            result,
            Validation::Valid {
                timestamp: T + 100,
                age: -100
            }
        );
    }

    #[test]
    fn zero_max_age_accepts_only_same_second() {
        let token = mint(SECRET, T);
        assert!(validate(&token, SECRET, T, 0).is_valid());
        assert!(!validate(&token, SECRET, T + 1, 0).is_valid());
    }

    #[test]
    fn key_minted_under_other_secret_is_rejected() {
        let token = mint("alpha", T);
        let result = validate(&token, "bravo", T, DEFAULT_MAX_AGE_SECS);
        assert!(!result.is_valid());
    }

    #[test]
    fn matching_claim_with_wrong_validator_secret_is_key_mismatch() {
        // Encrypted under the validator's key material, but claiming a
        // different secret: reaches the comparison step.
        let token = encode_value(&format!("other@{T}"), SECRET, true);
        let result = validate(&token, SECRET, T, DEFAULT_MAX_AGE_SECS);
        assert_eq!(result.message().unwrap(), "key mismatch");
    }

    #[test]
    fn claim_without_separator_is_malformed() {
        let token = encode_value("no-separator-here", SECRET, true);
        let result = validate(&token, SECRET, T, DEFAULT_MAX_AGE_SECS);
        assert_eq!(result.message().unwrap(), "invalid access key format");
    }

    #[test]
    fn claim_with_two_separators_is_malformed() {
        let token = encode_value(&format!("a@b@{T}"), SECRET, true);
        let result = validate(&token, SECRET, T, DEFAULT_MAX_AGE_SECS);
        assert_eq!(result.message().unwrap(), "invalid access key format");
    }

    #[test]
    fn non_numeric_timestamp_is_rejected() {
        let token = encode_value("secret@yesterday", SECRET, true);
        let result = validate(&token, SECRET, T, DEFAULT_MAX_AGE_SECS);
        assert_eq!(result.message().unwrap(), "invalid timestamp");
    }

    #[test]
    fn unserialized_payload_falls_back_to_raw_text() {
        // Some peers encrypt the bare claim without the PHP wrapper.
        let token = encode_value(&format!("{SECRET}@{T}"), SECRET, false);
        let result = validate(&token, SECRET, T, DEFAULT_MAX_AGE_SECS);
        assert_eq!(
            result,
            Validation::Valid {
                timestamp: T,
                age: 0
            }
        );
    }

    #[test]
    fn garbage_token_is_rejected_not_panicked() {
        for garbage in ["", "!!!", "AAAA", "bm90IGEga2V5", "s:5:\"hello\";"] {
            let result = validate(garbage, SECRET, T, DEFAULT_MAX_AGE_SECS);
            assert!(!result.is_valid(), "accepted garbage: {garbage:?}");
        }
    }

    #[test]
    fn single_character_tampering_is_rejected() {
        let token = mint(SECRET, T);
        for pos in [0, token.len() / 2, token.len() - 1] {
            let mut bytes = token.clone().into_bytes();
            bytes[pos] = if bytes[pos] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            let result = validate(&tampered, SECRET, T, DEFAULT_MAX_AGE_SECS);
            assert!(!result.is_valid(), "accepted tampered token at {pos}");
        }
    }

    #[test]
    fn prefixed_secret_mints_and_validates() {
        // The `base64:` prefix only affects key derivation; the claim keeps
        // the secret verbatim, so mint and validate must agree end to end.
        let secret = "base64:secret";
        let token = mint(secret, T);
        assert!(validate(&token, secret, T, DEFAULT_MAX_AGE_SECS).is_valid());
        // A validator configured with the unprefixed secret shares key
        // material but fails the claim comparison.
        let result = validate(&token, "secret", T, DEFAULT_MAX_AGE_SECS);
        assert_eq!(result.message().unwrap(), "key mismatch");
    }

    #[test]
    fn validate_with_uses_supplied_material() {
        let keys = keymat::derive(SECRET);
        let token = mint_with(&keys, SECRET, T);
        let result = validate_with(&keys, &token, SECRET, T, DEFAULT_MAX_AGE_SECS);
        assert!(result.is_valid());
    }
}
