//! Session and application-user records as seen by the gate.
//!
//! DESIGN
//! ======
//! The opaque access token never appears here. It stays inside the session
//! store adapter; the gate only needs the user identifier.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// A live authentication grant, reduced to what the gate may look at.
///
/// The user identifier is never empty; construction and deserialization both
/// reject blank identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSession")]
pub struct Session {
    user_id: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct RawSession {
    user_id: String,
    #[serde(default)]
    email: Option<String>,
}

impl TryFrom<RawSession> for Session {
    type Error = GateError;

    fn try_from(raw: RawSession) -> Result<Self, Self::Error> {
        Self::new(raw.user_id, raw.email)
    }
}

impl Session {
    /// Build a session for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Unexpected`] when `user_id` is blank.
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Result<Self, GateError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(GateError::Unexpected("session carries an empty user id".to_owned()));
        }
        Ok(Self { user_id, email })
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Application-level profile row, keyed 1:1 by the session's user id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationUser {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// RFC 3339 timestamp as returned by the backend.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ApplicationUser {
    /// Whether this row belongs to `session`.
    #[must_use]
    pub fn matches(&self, session: &Session) -> bool {
        self.id == session.user_id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// Change notification emitted by a session store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionEvent {
    pub kind: SessionEventKind,
    /// Session after the change; `None` once signed out.
    pub session: Option<Session>,
}

impl SessionEvent {
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        Self { kind: SessionEventKind::SignedIn, session: Some(session) }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { kind: SessionEventKind::SignedOut, session: None }
    }

    #[must_use]
    pub fn token_refreshed(session: Session) -> Self {
        Self { kind: SessionEventKind::TokenRefreshed, session: Some(session) }
    }
}
