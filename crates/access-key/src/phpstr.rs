//! PHP-style serialization of a single string value.
//!
//! The fleet's reference implementation wraps the plaintext in PHP's
//! serialized-string form before encrypting, so the payload is
//! self-describing on every side:
//!
//! ```text
//! s:<len>:"<value>";
//! ```
//!
//! `<len>` is the exact **byte** length of `<value>`, matching PHP's
//! `strlen` semantics. Only this single-string form is supported — not full
//! PHP serialization of arbitrary types.

use thiserror::Error;

/// Errors produced when parsing a serialized payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    /// The text does not have the `s:<len>:"<value>";` shape.
    #[error("payload is not a serialized string")]
    Format,

    /// The declared length disagrees with the content actually present.
    #[error("declared length {declared} does not match content length {actual}")]
    LengthMismatch {
        /// Length declared in the `s:<len>:` prefix.
        declared: usize,
        /// Byte length of the captured content.
        actual: usize,
    },
}

/// Serialize `value` into its PHP string form.
pub fn serialize(value: &str) -> String {
    format!("s:{}:\"{}\";", value.len(), value)
}

/// Parse a serialized payload back into the contained string.
///
/// # Errors
///
/// Returns [`PayloadError::Format`] unless `text` starts with `s:`, carries
/// an ASCII-digit length, opens the content with `:"` and closes it with
/// `";` at the very end. Returns [`PayloadError::LengthMismatch`] when the
/// declared length differs from the content's byte length.
pub fn deserialize(text: &str) -> Result<String, PayloadError> {
    let rest = text.strip_prefix("s:").ok_or(PayloadError::Format)?;
    let colon = rest.find(':').ok_or(PayloadError::Format)?;
    let (len_str, tail) = rest.split_at(colon);

    if len_str.is_empty() || !len_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PayloadError::Format);
    }
    let declared: usize = len_str.parse().map_err(|_| PayloadError::Format)?;

    let content = tail[1..]
        .strip_prefix('"')
        .and_then(|c| c.strip_suffix("\";"))
        .ok_or(PayloadError::Format)?;

    if content.len() != declared {
        return Err(PayloadError::LengthMismatch {
            declared,
            actual: content.len(),
        });
    }
    Ok(content.to_owned())
}
