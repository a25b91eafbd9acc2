//! Hosted-backend handles shared by every page.
//!
//! Configuration is baked in at compile time through `option_env!`, since
//! the WASM bundle has no process environment to read at runtime.
//!
//! ERROR HANDLING
//! ==============
//! A missing backend URL or key leaves `Services` out of context; pages
//! check with `use_context` and show a message instead of panicking during
//! hydration.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use backend::{BackendConfig, BackendError, Clock, HostedAuth, HostedClient, HostedDirectory, TokenVault};
use gate::{ApplicationUser, GateConfig, Session};

use crate::util::auth::default_display_name;

#[derive(Clone, Debug)]
pub struct Services {
    pub auth: HostedAuth,
    pub directory: HostedDirectory,
    pub gate: GateConfig,
}

impl Services {
    /// Build from values captured at compile time.
    ///
    /// # Errors
    ///
    /// Returns an error message when the backend or gate config is invalid.
    pub fn from_build_env() -> Result<Self, String> {
        Self::from_lookup(build_env)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = BackendConfig::from_lookup(&lookup).map_err(|e| e.to_string())?;
        let gate = GateConfig::from_lookup(&lookup).map_err(|e| e.to_string())?;
        let client = HostedClient::new(backend).map_err(|e| e.to_string())?;
        let auth = HostedAuth::new(client, vault(), clock());
        let directory = HostedDirectory::new(auth.clone());
        Ok(Self { auth, directory, gate })
    }

    /// Make sure a freshly signed-in `session` has its profile row, so the
    /// gate does not treat it as orphaned. `display_name` defaults to one
    /// derived from the account email.
    ///
    /// # Errors
    ///
    /// Backend failures while reading or creating the row.
    pub async fn ensure_profile(
        &self,
        session: &Session,
        display_name: Option<&str>,
    ) -> Result<ApplicationUser, BackendError> {
        let name = display_name.map_or_else(|| default_display_name(session), str::to_owned);
        self.directory.ensure_profile(session, &name).await
    }
}

fn build_env(key: &str) -> Option<String> {
    let value = match key {
        "AGORA_BACKEND_URL" => option_env!("AGORA_BACKEND_URL"),
        "AGORA_BACKEND_ANON_KEY" => option_env!("AGORA_BACKEND_ANON_KEY"),
        "AGORA_BACKEND_TIMEOUT_SECS" => option_env!("AGORA_BACKEND_TIMEOUT_SECS"),
        "AGORA_OAUTH_REDIRECT_URL" => option_env!("AGORA_OAUTH_REDIRECT_URL"),
        "GATE_LOGIN_PATH" => option_env!("GATE_LOGIN_PATH"),
        "GATE_HOME_PATH" => option_env!("GATE_HOME_PATH"),
        "GATE_MIN_PENDING_MS" => option_env!("GATE_MIN_PENDING_MS"),
        "GATE_FORBID_AUTH_ON_ERROR" => option_env!("GATE_FORBID_AUTH_ON_ERROR"),
        _ => None,
    };
    value.map(str::to_owned)
}

#[cfg(feature = "hydrate")]
fn vault() -> Arc<dyn TokenVault> {
    Arc::new(super::browser::LocalStorageVault)
}

#[cfg(not(feature = "hydrate"))]
fn vault() -> Arc<dyn TokenVault> {
    Arc::new(backend::MemoryVault::new())
}

#[cfg(feature = "hydrate")]
fn clock() -> Arc<dyn Clock> {
    Arc::new(super::browser::BrowserClock)
}

#[cfg(not(feature = "hydrate"))]
fn clock() -> Arc<dyn Clock> {
    Arc::new(backend::SystemClock)
}

/// Visitor-facing text for a failed auth or profile call.
pub fn error_message(error: &BackendError) -> String {
    match error {
        BackendError::Status { status: 400 | 401, message } if message.is_empty() => {
            "Those credentials were not accepted.".to_owned()
        }
        BackendError::Status { message, .. } if !message.is_empty() => message.clone(),
        BackendError::Status { status, .. } => format!("Request failed ({status})."),
        BackendError::Transport(_) => "Could not reach the server. Try again.".to_owned(),
        BackendError::NotSignedIn => "Your session has ended. Sign in again.".to_owned(),
        BackendError::MissingVerifier => "That sign-in link has expired. Start again.".to_owned(),
        BackendError::Decode(_) | BackendError::Vault(_) | BackendError::Config(_) => {
            "Something went wrong. Try again.".to_owned()
        }
    }
}
