//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The OAuth callback reports failures by redirecting to the login page with
//! a short machine-readable reason; the login page turns it back into text.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use backend::BackendError;
use gate::Session;

use crate::util::validate::MAX_DISPLAY_NAME_CHARS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackFailure {
    /// The provider redirected back with `error=...` (consent declined).
    ProviderDenied,
    /// Neither `code` nor `error` in the callback URL.
    MissingCode,
    /// No verifier in this browser: the flow was started elsewhere or expired.
    NoPendingSignIn,
    /// The backend refused or failed the code exchange.
    ExchangeFailed,
    /// Signed in, but the profile row could not be found or created.
    ProfileSetupFailed,
}

impl CallbackFailure {
    pub fn reason(self) -> &'static str {
        match self {
            Self::ProviderDenied => "provider_denied",
            Self::MissingCode => "missing_code",
            Self::NoPendingSignIn => "no_pending_sign_in",
            Self::ExchangeFailed => "exchange_failed",
            Self::ProfileSetupFailed => "profile_setup_failed",
        }
    }

    pub fn from_reason(reason: &str) -> Option<Self> {
        match reason {
            "provider_denied" => Some(Self::ProviderDenied),
            "missing_code" => Some(Self::MissingCode),
            "no_pending_sign_in" => Some(Self::NoPendingSignIn),
            "exchange_failed" => Some(Self::ExchangeFailed),
            "profile_setup_failed" => Some(Self::ProfileSetupFailed),
            _ => None,
        }
    }

    pub fn from_exchange_error(error: &BackendError) -> Self {
        match error {
            BackendError::MissingVerifier => Self::NoPendingSignIn,
            _ => Self::ExchangeFailed,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::ProviderDenied => "Sign-in was cancelled at the provider.",
            Self::MissingCode => "The sign-in response was incomplete. Try again.",
            Self::NoPendingSignIn => "That sign-in link has expired. Start again.",
            Self::ExchangeFailed => "Could not complete sign-in. Try again.",
            Self::ProfileSetupFailed => "Your profile could not be set up. Try signing in again.",
        }
    }
}

/// Login path carrying a callback failure reason.
pub fn login_error_path(login_path: &str, failure: CallbackFailure) -> String {
    format!("{login_path}?error={}", failure.reason())
}

/// What the callback page should do with the provider's query parameters.
pub fn classify_callback(code: Option<&str>, error: Option<&str>) -> Result<String, CallbackFailure> {
    if error.is_some_and(|e| !e.trim().is_empty()) {
        return Err(CallbackFailure::ProviderDenied);
    }
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .ok_or(CallbackFailure::MissingCode)
}

/// Message for the login page's `?error=` parameter. Unknown reasons get a
/// generic message rather than being echoed back.
pub fn login_error_message(reason: &str) -> &'static str {
    CallbackFailure::from_reason(reason).map_or("Sign-in failed. Try again.", CallbackFailure::message)
}

/// Display name for an account that signed in before it had a profile row:
/// the local part of its email, or a placeholder when there is none.
pub fn default_display_name(session: &Session) -> String {
    let local = session.email().and_then(|email| email.split('@').next()).map(str::trim).unwrap_or_default();
    if local.is_empty() {
        return "Member".to_owned();
    }
    local.chars().take(MAX_DISPLAY_NAME_CHARS).collect()
}
