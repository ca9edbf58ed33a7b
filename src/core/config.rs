//! Tracker configuration
//!
//! Compiled-in defaults, overridable from JSON (browser) or environment
//! variables (native binary).

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::TrackError;
use super::report::TRACKING_API_PATH;

/// Default bound on a single report request
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

pub const ENV_ENDPOINT: &str = "TIME_TRACKER_ENDPOINT";
pub const ENV_TIMEOUT_MS: &str = "TIME_TRACKER_TIMEOUT_MS";
pub const ENV_REOPEN: &str = "TIME_TRACKER_REOPEN";
pub const ENV_USER: &str = "TIME_TRACKER_USER";

/// Identity the native binary tracks when `TIME_TRACKER_USER` is unset
pub const DEFAULT_USER: &str = "user123";

/// What a return to "visible" does to a closed session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReopenPolicy {
    /// Track only until the first hide/unload
    #[default]
    Never,
    /// Reopen the interval and keep accumulating across hide/show cycles
    OnVisible,
}

impl std::str::FromStr for ReopenPolicy {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(ReopenPolicy::Never),
            "on_visible" | "on-visible" => Ok(ReopenPolicy::OnVisible),
            other => Err(TrackError::InvalidConfig(format!(
                "unknown reopen policy '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Collector URL; relative paths resolve against the page origin in the browser
    pub endpoint: String,
    pub request_timeout_ms: u64,
    pub reopen_policy: ReopenPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: TRACKING_API_PATH.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            reopen_policy: ReopenPolicy::default(),
        }
    }
}

impl TrackerConfig {
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrackError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if self.endpoint.trim().is_empty() {
            return Err(TrackError::InvalidConfig("endpoint is empty".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(TrackError::InvalidConfig(
                "request_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Defaults overridden by `TIME_TRACKER_*` variables. Bad values are logged and skipped.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Identity for the native binary, from `TIME_TRACKER_USER`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn user_from_env() -> String {
        Self::user_from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    fn user_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> String {
        lookup(ENV_USER)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER.to_string())
    }

    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.request_timeout_ms = ms,
                _ => warn!(key = ENV_TIMEOUT_MS, value = %raw, "Ignoring invalid timeout"),
            }
        }

        if let Some(raw) = lookup(ENV_REOPEN) {
            match raw.parse() {
                Ok(policy) => config.reopen_policy = policy,
                Err(e) => warn!(key = ENV_REOPEN, error = %e, "Ignoring invalid reopen policy"),
            }
        }

        config
    }
}
