//! Error taxonomy shared by the gate and its collaborators.
//!
//! ERROR HANDLING
//! ==============
//! None of these escape [`crate::AuthGate::evaluate`]: the gate logs them and
//! folds them into a terminal state. They do escape the session store and
//! directory adapters, which is how the gate learns what went wrong.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The session store could not be reached, or refused the call.
    #[error("session transport failed: {0}")]
    Transport(String),
    /// The user directory lookup failed.
    #[error("directory query failed: {0}")]
    Query(String),
    /// Anything else: malformed payloads, broken invariants.
    #[error("unexpected gate failure: {0}")]
    Unexpected(String),
    #[error("invalid gate config: {0}")]
    Config(String),
}

impl GateError {
    /// Whether this error belongs to the "unexpected" class that triggers the
    /// requirement-specific fallback instead of the normal no-session path.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Unexpected(_))
    }
}
