//! Symmetric access-key codec shared by the service fleet.
//!
//! Mints and validates the short-lived `Access-Key` header value that
//! authenticates cross-service HTTP requests. Several independently-written
//! backends (PHP/Laravel among them) must decrypt keys minted here and vice
//! versa, so every stage is a frozen wire contract:
//!
//! ```text
//! access_key = base64( base64( AES-256-CBC( s:<len>:"<secret>@<unix>"; ) ) )
//! ```
//!
//! - [`keymat`] derives the cipher key and IV from the shared secret
//!   (SHA-256 hex truncation — the *text* of the digest, not its bytes).
//! - [`phpstr`] implements the PHP-style `s:<len>:"<value>";` string
//!   serialization the fleet expects inside the ciphertext.
//! - [`cipher`] is AES-256-CBC with PKCS7 padding.
//! - [`token`] composes the above plus the freshness check.
//! - [`cache`] memoises derived key material per secret.
//!
//! Do not "fix" the unusual constructions (hex-text keys, fixed IV, double
//! base64): changing any of them breaks every peer service. See the module
//! docs for the specifics.

pub mod cache;
pub mod cipher;
pub mod keymat;
pub mod phpstr;
pub mod token;

pub use cache::KeyCache;
pub use keymat::{derive, KeyMaterial, IV_LEN, KEY_LEN};
pub use token::{
    mint, mint_with, validate, validate_with, RejectReason, Validation, DEFAULT_MAX_AGE_SECS,
};
