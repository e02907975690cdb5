//! Configuration loading and validation for the keygate sidecar.
//!
//! All values are read from environment variables at startup. The process
//! will exit with a clear error message if any required variable is missing
//! or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use access_key::keymat::SECRET_PREFIX;
use access_key::DEFAULT_MAX_AGE_SECS;

/// Validated keygate configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Shared secret configured identically across the fleet, optionally
    /// carrying the literal `base64:` prefix. **Required.**
    pub app_key: String,

    /// HTTP header carrying the access key on inbound requests.
    #[serde(default = "default_access_key_header")]
    pub access_key_header: String,

    /// Maximum accepted key age in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: i64,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The shared secret must never reach logs or crash reports.
        f.debug_struct("Config")
            .field("app_key", &"[REDACTED]")
            .field("access_key_header", &self.access_key_header)
            .field("max_age_secs", &self.max_age_secs)
            .field("listen_port", &self.listen_port)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn default_access_key_header() -> String {
    "Access-Key".into()
}
fn default_max_age_secs() -> i64 {
    DEFAULT_MAX_AGE_SECS
}
fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be
    /// parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first
    /// failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.app_key, "APP_KEY")?;
        ensure_non_empty(&self.access_key_header, "ACCESS_KEY_HEADER")?;

        // A bare prefix leaves nothing to hash.
        if self.app_key.strip_prefix(SECRET_PREFIX) == Some("") {
            anyhow::bail!("APP_KEY must not be the `{SECRET_PREFIX}` prefix alone");
        }
        if self.max_age_secs < 0 {
            anyhow::bail!("MAX_AGE_SECS must be >= 0");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
