//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Written only by the session mirror started in `app`. Components read it
//! for identity-dependent rendering; access decisions belong to the gate.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use gate::{ApplicationUser, MirrorSnapshot, Session};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<Session>,
    pub profile: Option<ApplicationUser>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self { user: None, profile: None, loading: true }
    }
}

impl From<&MirrorSnapshot> for AuthState {
    fn from(snapshot: &MirrorSnapshot) -> Self {
        Self { user: snapshot.user.clone(), profile: snapshot.profile.clone(), loading: snapshot.loading }
    }
}

impl AuthState {
    /// Name to greet the visitor with: profile name, else email, else "there".
    pub fn greeting_name(&self) -> String {
        if let Some(profile) = &self.profile {
            return profile.display_name.clone();
        }
        self.user
            .as_ref()
            .and_then(Session::email)
            .map_or_else(|| "there".to_owned(), str::to_owned)
    }
}
