//! AES-256-CBC encryption and decryption of serialized payloads.
//!
//! The key and IV from [`KeyMaterial`](crate::keymat::KeyMaterial) are used
//! directly as cipher parameters (not re-hashed), with PKCS7 block padding.
//! Identical plaintext + secret always produces identical ciphertext — the
//! IV is fixed per secret, which peer services rely on for byte-exact
//! interoperability.
//!
//! **Do NOT substitute an AEAD or randomise the IV.** Either change breaks
//! decryption on every other service in the fleet.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use thiserror::Error;

use crate::keymat::KeyMaterial;

/// AES block size in bytes; all ciphertext lengths are multiples of this.
pub const BLOCK_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The ciphertext is empty or not a multiple of [`BLOCK_LEN`] bytes.
    #[error("ciphertext length {0} is not a positive multiple of {BLOCK_LEN}")]
    Misaligned(usize),

    /// PKCS7 padding verification failed — wrong key or corrupted data.
    #[error("padding check failed")]
    Padding,
}

/// Encrypt `plaintext` under `keys` with AES-256-CBC + PKCS7.
///
/// Infallible: padding always succeeds and the key/IV lengths are enforced
/// by [`KeyMaterial`]'s types.
pub fn encrypt(keys: &KeyMaterial, plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(&keys.key.into(), &keys.iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt `ciphertext` under `keys`, verifying and removing PKCS7 padding.
///
/// # Errors
///
/// Returns [`CipherError::Misaligned`] for truncated or empty input and
/// [`CipherError::Padding`] when the padding check fails (wrong key or
/// tampered ciphertext). No partial plaintext is ever returned.
pub fn decrypt(keys: &KeyMaterial, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::Misaligned(ciphertext.len()));
    }
    Aes256CbcDec::new(&keys.key.into(), &keys.iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::Padding)
}
