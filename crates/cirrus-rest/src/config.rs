//! Application configuration.
//!
//! Configuration is explicit: a [`CirrusConfig`] is built once and passed
//! into every component at construction. There is no process-wide mutable
//! state.
//!
//! Loading flow:
//! 1. Start with compiled [`CirrusConfig::default()`]
//! 2. If a JSON config file is given, deep-merge its values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::{RestError, RestResult};

/// Default REST endpoint.
const DEFAULT_BASE_URL: &str = "https://api.cirrus.cloud";

/// Client configuration for one application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CirrusConfig {
    /// REST endpoint base URL, without a trailing slash.
    pub base_url: String,

    /// Application identifier.
    pub app_id: String,

    /// REST API key for the application.
    pub api_key: String,

    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Interval between poll requests on the polling transport,
    /// in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for CirrusConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            app_id: String::new(),
            api_key: String::new(),
            request_timeout_ms: 30_000,
            poll_interval_ms: 1_000,
        }
    }
}

impl CirrusConfig {
    /// Create a config for the given application credentials, with
    /// defaults for everything else.
    #[must_use]
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Root of every REST URL: `<base_url>/<app_id>/<api_key>`.
    #[must_use]
    pub fn app_path(&self) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.app_id,
            self.api_key
        )
    }

    /// Reject configs that cannot produce valid URLs.
    pub fn validate(&self) -> RestResult<()> {
        if self.app_id.is_empty() {
            return Err(RestError::InvalidConfig {
                message: "appId must not be empty".into(),
            });
        }
        if self.api_key.is_empty() {
            return Err(RestError::InvalidConfig {
                message: "apiKey must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Load configuration from a JSON file (if it exists) with env overrides.
///
/// A missing file yields defaults; invalid JSON is an error.
pub fn load_config_from_path(path: &Path) -> RestResult<CirrusConfig> {
    let defaults = serde_json::to_value(CirrusConfig::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading config from file");
        let content = std::fs::read_to_string(path).map_err(|e| RestError::InvalidConfig {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "config file not found, using defaults");
        defaults
    };

    let mut config: CirrusConfig = serde_json::from_value(merged)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded config.
///
/// Invalid values are ignored (fall back to file/default) with a warning.
pub fn apply_env_overrides(config: &mut CirrusConfig) {
    if let Some(v) = read_env_string("CIRRUS_BASE_URL") {
        config.base_url = v;
    }
    if let Some(v) = read_env_string("CIRRUS_APP_ID") {
        config.app_id = v;
    }
    if let Some(v) = read_env_string("CIRRUS_API_KEY") {
        config.api_key = v;
    }
    if let Some(v) = read_env_u64("CIRRUS_REQUEST_TIMEOUT_MS", 100, 600_000) {
        config.request_timeout_ms = v;
    }
    if let Some(v) = read_env_u64("CIRRUS_POLL_INTERVAL_MS", 100, 600_000) {
        config.poll_interval_ms = v;
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}
