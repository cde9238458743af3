//! Connection settings with environment overrides.
//!
//! Defaults come from [`ConnectionConfig::default()`]; a JSON document may
//! override any subset of fields, and `RECSTORE_*` environment variables take
//! precedence over both. Out-of-range or unparsable env values are ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Env var overriding [`ConnectionConfig::busy_timeout_ms`].
pub const ENV_BUSY_TIMEOUT_MS: &str = "RECSTORE_BUSY_TIMEOUT_MS";
/// Env var overriding [`ConnectionConfig::checkout_timeout_ms`].
pub const ENV_CHECKOUT_TIMEOUT_MS: &str = "RECSTORE_CHECKOUT_TIMEOUT_MS";

/// Settings for the single pooled connection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// How long a statement waits on a locked database before failing
    /// (default: 5000).
    pub busy_timeout_ms: u32,
    /// How long a caller waits for the pooled connection before failing
    /// (default: 30000).
    pub checkout_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            checkout_timeout_ms: 30_000,
        }
    }
}

impl ConnectionConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Apply `RECSTORE_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = read_env_u64(ENV_BUSY_TIMEOUT_MS, 0, u64::from(u32::MAX)) {
            self.busy_timeout_ms = v as u32;
        }
        if let Some(v) = read_env_u64(ENV_CHECKOUT_TIMEOUT_MS, 1, 3_600_000) {
            self.checkout_timeout_ms = v;
        }
    }
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    let parsed = parse_u64_in_range(&raw, min, max);
    if parsed.is_none() {
        debug!(name, value = %raw, "ignoring invalid env override");
    }
    parsed
}

/// Parse a trimmed unsigned integer and check it lies in `min..=max`.
pub fn parse_u64_in_range(val: &str, min: u64, max: u64) -> Option<u64> {
    val.trim()
        .parse::<u64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}
