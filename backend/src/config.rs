//! Hosted backend configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::error::BackendError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_OAUTH_REDIRECT_URL: &str = "http://localhost:3000/auth/callback";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project base URL, without trailing slash.
    pub base_url: String,
    /// Public anonymous key sent as `apikey` on every request.
    pub anon_key: String,
    /// Transport timeout. Ignored in the browser, where `fetch` decides.
    pub timeout: Duration,
    /// Where the provider sends the browser after OAuth consent.
    pub oauth_redirect_url: String,
}

impl BackendConfig {
    #[must_use]
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            anon_key: anon_key.trim().to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            oauth_redirect_url: DEFAULT_OAUTH_REDIRECT_URL.to_owned(),
        }
    }

    /// Build typed backend config from environment variables.
    ///
    /// Required:
    /// - `AGORA_BACKEND_URL`
    /// - `AGORA_BACKEND_ANON_KEY`
    ///
    /// Optional:
    /// - `AGORA_BACKEND_TIMEOUT_SECS`: default 15
    /// - `AGORA_OAUTH_REDIRECT_URL`: default `http://localhost:3000/auth/callback`
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Config`] when a required value is missing or
    /// the URL is not http(s).
    pub fn from_env() -> Result<Self, BackendError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BackendConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`BackendConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BackendError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = required(&lookup, "AGORA_BACKEND_URL")?;
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(BackendError::Config(format!("AGORA_BACKEND_URL must be http(s), got '{base_url}'")));
        }
        let anon_key = required(&lookup, "AGORA_BACKEND_ANON_KEY")?;

        let mut config = Self::new(&base_url, &anon_key);
        config.timeout = Duration::from_secs(
            lookup("AGORA_BACKEND_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );
        if let Some(url) = lookup("AGORA_OAUTH_REDIRECT_URL").filter(|v| !v.trim().is_empty()) {
            config.oauth_redirect_url = url.trim().to_owned();
        }
        Ok(config)
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, BackendError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BackendError::Config(format!("{key} not set")))
}
