//! Gate configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::error::GateError;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/";

/// What a `ForbidAuth` page does when the session check fails unexpectedly.
///
/// `Allow` keeps the public page reachable (fail open); `Deny` redirects as
/// if a session existed (fail closed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForbidErrorPolicy {
    #[default]
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Redirect for `RequireAuth` pages that do not name their own target.
    pub login_path: String,
    /// Redirect for `ForbidAuth` pages that do not name their own target.
    pub home_path: String,
    /// Cosmetic minimum time the loading indicator stays up. Off when `None`.
    pub min_pending: Option<Duration>,
    pub forbid_on_error: ForbidErrorPolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            home_path: DEFAULT_HOME_PATH.to_owned(),
            min_pending: None,
            forbid_on_error: ForbidErrorPolicy::Allow,
        }
    }
}

impl GateConfig {
    /// Build typed gate config from environment variables.
    ///
    /// Optional:
    /// - `GATE_LOGIN_PATH`: default `/login`
    /// - `GATE_HOME_PATH`: default `/`
    /// - `GATE_MIN_PENDING_MS`: unset or `0` disables the minimum loading time
    /// - `GATE_FORBID_AUTH_ON_ERROR`: `allow` (default) or `deny`
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Config`] for unparsable values.
    pub fn from_env() -> Result<Self, GateError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GateConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Config`] for unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let login_path = parse_path("GATE_LOGIN_PATH", lookup("GATE_LOGIN_PATH"), DEFAULT_LOGIN_PATH)?;
        let home_path = parse_path("GATE_HOME_PATH", lookup("GATE_HOME_PATH"), DEFAULT_HOME_PATH)?;
        let min_pending = parse_min_pending(lookup("GATE_MIN_PENDING_MS").as_deref())?;
        let forbid_on_error = parse_forbid_policy(lookup("GATE_FORBID_AUTH_ON_ERROR").as_deref())?;

        Ok(Self { login_path, home_path, min_pending, forbid_on_error })
    }

    #[must_use]
    pub fn with_min_pending(mut self, duration: Duration) -> Self {
        self.min_pending = Some(duration).filter(|d| !d.is_zero());
        self
    }

    #[must_use]
    pub fn with_forbid_on_error(mut self, policy: ForbidErrorPolicy) -> Self {
        self.forbid_on_error = policy;
        self
    }
}

fn parse_path(key: &str, raw: Option<String>, default: &str) -> Result<String, GateError> {
    let value = raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
    match value {
        None => Ok(default.to_owned()),
        Some(path) if path.starts_with('/') => Ok(path),
        Some(path) => Err(GateError::Config(format!("{key} must be an absolute path, got '{path}'"))),
    }
}

fn parse_min_pending(raw: Option<&str>) -> Result<Option<Duration>, GateError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let millis = raw
        .parse::<u64>()
        .map_err(|_| GateError::Config(format!("GATE_MIN_PENDING_MS must be an integer, got '{raw}'")))?;
    Ok(Some(Duration::from_millis(millis)).filter(|d| !d.is_zero()))
}

fn parse_forbid_policy(raw: Option<&str>) -> Result<ForbidErrorPolicy, GateError> {
    match raw.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("" | "allow") => Ok(ForbidErrorPolicy::Allow),
        Some("deny") => Ok(ForbidErrorPolicy::Deny),
        Some(other) => Err(GateError::Config(format!(
            "unsupported GATE_FORBID_AUTH_ON_ERROR '{other}' (expected 'allow' or 'deny')"
        ))),
    }
}
