//! `users` table access.

#[cfg(test)]
#[path = "directory_test.rs"]
mod directory_test;

use async_trait::async_trait;
use gate::{ApplicationUser, GateError, Session, SessionEvent, SessionEventKind, UserDirectory};

use crate::auth::HostedAuth;
use crate::error::BackendError;
use crate::models::{NewProfile, ProfileUpdate};

/// Reads and writes application user rows as the signed-in visitor, so the
/// backend's row-level policies apply. Falls back to the anon key when no
/// one is signed in.
#[derive(Clone, Debug)]
pub struct HostedDirectory {
    auth: HostedAuth,
}

impl HostedDirectory {
    #[must_use]
    pub fn new(auth: HostedAuth) -> Self {
        Self { auth }
    }

    /// Create the profile row for a freshly registered account.
    ///
    /// # Errors
    ///
    /// [`BackendError::NotSignedIn`] without a session; backend failures otherwise.
    pub async fn create_profile(&self, row: &NewProfile) -> Result<ApplicationUser, BackendError> {
        let token = self.auth.access_token().await?.ok_or(BackendError::NotSignedIn)?;
        let created = self.auth.client().insert_user(row, &token).await?;
        created.ok_or_else(|| BackendError::Decode("insert returned no row".into()))
    }

    /// Return the profile row for `session`, creating it with `display_name`
    /// when the account has none yet (first OAuth sign-in, a confirmed
    /// sign-up, or a registration whose row insert failed).
    ///
    /// Creating a row broadcasts `UserUpdated` so mirrors pick it up.
    ///
    /// # Errors
    ///
    /// [`BackendError::NotSignedIn`] without a session; backend failures otherwise.
    pub async fn ensure_profile(&self, session: &Session, display_name: &str) -> Result<ApplicationUser, BackendError> {
        let token = self.auth.access_token().await?.ok_or(BackendError::NotSignedIn)?;
        let id = session.user_id();
        if let Some(row) = self.auth.client().select_user(id, Some(&token)).await? {
            return Ok(row);
        }

        let row = NewProfile { id: id.to_owned(), display_name: display_name.to_owned(), bio: None };
        match self.create_profile(&row).await {
            Ok(created) => {
                tracing::info!(user_id = %created.id, "profile row created");
                self.auth.notify(&SessionEvent { kind: SessionEventKind::UserUpdated, session: Some(session.clone()) });
                Ok(created)
            }
            // Lost a race with another tab creating the same row.
            Err(BackendError::Status { status: 409, .. }) => {
                self.auth.client().select_user(id, Some(&token)).await?.ok_or_else(|| not_found(id))
            }
            Err(e) => Err(e),
        }
    }

    /// Apply `update` to the row `id` and return the updated row.
    ///
    /// Broadcasts a `UserUpdated` event so mirrors refetch the profile.
    ///
    /// # Errors
    ///
    /// [`BackendError::NotSignedIn`] without a session; a
    /// [`BackendError::Status`] 404 when no row matched.
    pub async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<ApplicationUser, BackendError> {
        let token = self.auth.access_token().await?.ok_or(BackendError::NotSignedIn)?;
        if update.is_empty() {
            return self
                .auth
                .client()
                .select_user(id, Some(&token))
                .await?
                .ok_or_else(|| not_found(id));
        }

        let row = self.auth.client().update_user(id, update, &token).await?.ok_or_else(|| not_found(id))?;
        tracing::info!(user_id = %row.id, "profile updated");
        if let Ok(Some(session)) = gate::SessionStore::current_session(&self.auth).await {
            self.auth.notify(&SessionEvent { kind: SessionEventKind::UserUpdated, session: Some(session) });
        }
        Ok(row)
    }
}

fn not_found(id: &str) -> BackendError {
    BackendError::Status { status: 404, message: format!("no user row for {id}") }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl UserDirectory for HostedDirectory {
    async fn user_by_id(&self, id: &str) -> Result<Option<ApplicationUser>, GateError> {
        let token = self.auth.access_token().await.map_err(BackendError::into_query_error)?;
        self.auth
            .client()
            .select_user(id, token.as_deref())
            .await
            .map_err(BackendError::into_query_error)
    }
}
