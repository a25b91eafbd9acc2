//! Wire shapes exchanged with the hosted backend.

#[cfg(test)]
#[path = "models_test.rs"]
mod models_test;

use gate::{GateError, Session};
use serde::{Deserialize, Serialize};

/// Refresh a grant this many seconds before it actually expires.
pub const REFRESH_MARGIN_SECS: u64 = 60;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token endpoint response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: AuthUser,
}

/// Sign-up answers with a grant when auto-confirm is on, and with the bare
/// user when the address still needs confirming.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Grant(TokenGrant),
    Pending(AuthUser),
}

/// Grant as persisted in the vault, with an absolute expiry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: u64,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl StoredGrant {
    #[must_use]
    pub fn from_grant(grant: TokenGrant, now: u64) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: now.saturating_add(grant.expires_in),
            user_id: grant.user.id,
            email: grant.user.email,
        }
    }

    #[must_use]
    pub fn needs_refresh(&self, now: u64) -> bool {
        now.saturating_add(REFRESH_MARGIN_SECS) >= self.expires_at
    }

    /// # Errors
    ///
    /// [`GateError::Unexpected`] when the stored user id is blank.
    pub fn session(&self) -> Result<Session, GateError> {
        Session::new(self.user_id.clone(), self.email.clone())
    }
}

/// Row inserted into `users` after registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Partial update of a `users` row. Unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }
}

/// Error envelope. Auth and REST endpoints disagree on the field name.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message).or(self.error)
    }
}
