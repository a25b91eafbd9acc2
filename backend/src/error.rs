//! Backend error type and its translation into gate errors.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use gate::GateError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("token vault error: {0}")]
    Vault(String),
    #[error("backend config error: {0}")]
    Config(String),
    #[error("no pending oauth sign-in")]
    MissingVerifier,
    #[error("not signed in")]
    NotSignedIn,
}

impl BackendError {
    /// Whether the backend refused the credentials, as opposed to failing.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Status { status: 400 | 401 | 403, .. })
    }

    /// Translate for [`gate::SessionStore`] callers.
    #[must_use]
    pub fn into_session_error(self) -> GateError {
        match self {
            Self::Decode(msg) => GateError::Unexpected(msg),
            Self::Vault(msg) => GateError::Unexpected(format!("token vault: {msg}")),
            other => GateError::Transport(other.to_string()),
        }
    }

    /// Translate for [`gate::UserDirectory`] callers.
    #[must_use]
    pub fn into_query_error(self) -> GateError {
        GateError::Query(self.to_string())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
