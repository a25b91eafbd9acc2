//! Hosted authentication session store.
//!
//! DESIGN
//! ======
//! The token grant lives in a [`TokenVault`]; reading the current session
//! never touches the network unless the grant is about to expire, in which
//! case it is refreshed first. A refresh the backend rejects means the
//! session is gone: the vault is cleared and `SignedOut` is broadcast so the
//! mirror and any open pages catch up.
//!
//! Refreshes are single-flight. The backend rotates refresh tokens on use, so
//! callers queue on `refresh_lock` and re-read the vault once they hold it.
//!
//! Sign-out clears the local grant before calling the backend, so a failed
//! remote logout still leaves this browser signed out.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use async_trait::async_trait;
use futures::lock::Mutex;
use gate::{GateError, Session, SessionBroadcaster, SessionEvent, SessionListener, SessionStore, Subscription};

use crate::clock::Clock;
use crate::error::BackendError;
use crate::http::HostedClient;
use crate::models::{SignUpResponse, StoredGrant, TokenGrant};
use crate::pkce;
use crate::vault::{GRANT_KEY, TokenVault, VERIFIER_KEY};

/// External identity providers offered on the login page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Account created and signed in.
    SignedIn(Session),
    /// Account created; the address must be confirmed before signing in.
    ConfirmationRequired,
}

#[derive(Clone)]
pub struct HostedAuth {
    inner: Arc<Inner>,
}

struct Inner {
    client: HostedClient,
    vault: Arc<dyn TokenVault>,
    clock: Arc<dyn Clock>,
    events: SessionBroadcaster,
    refresh_lock: Mutex<()>,
}

impl HostedAuth {
    pub fn new(client: HostedClient, vault: Arc<dyn TokenVault>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                vault,
                clock,
                events: SessionBroadcaster::new(),
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn client(&self) -> &HostedClient {
        &self.inner.client
    }

    /// # Errors
    ///
    /// [`BackendError::Status`] with an auth-rejection status for bad
    /// credentials; transport and vault failures otherwise.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let grant = self.inner.client.password_grant(email, password).await?;
        let session = self.adopt(grant)?;
        tracing::info!(user_id = session.user_id(), "signed in with password");
        self.inner.events.emit(&SessionEvent::signed_in(session.clone()));
        Ok(session)
    }

    /// # Errors
    ///
    /// [`BackendError::Status`] when the backend refuses the registration.
    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<SignUpOutcome, BackendError> {
        match self.inner.client.sign_up(email, password, display_name).await? {
            SignUpResponse::Grant(grant) => {
                let session = self.adopt(grant)?;
                tracing::info!(user_id = session.user_id(), "registered and signed in");
                self.inner.events.emit(&SessionEvent::signed_in(session.clone()));
                Ok(SignUpOutcome::SignedIn(session))
            }
            SignUpResponse::Pending(user) => {
                tracing::info!(user_id = %user.id, "registered, awaiting confirmation");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    /// Start an OAuth sign-in. Returns the provider URL to send the browser to.
    ///
    /// # Errors
    ///
    /// [`BackendError::Vault`] when the verifier cannot be stored.
    pub fn begin_oauth(&self, provider: OAuthProvider) -> Result<String, BackendError> {
        let verifier = pkce::new_verifier();
        self.inner.vault.set(VERIFIER_KEY, &verifier)?;
        self.inner.client.authorize_url(provider.as_str(), &pkce::challenge(&verifier))
    }

    /// Finish an OAuth sign-in with the `code` the provider redirected back with.
    ///
    /// # Errors
    ///
    /// [`BackendError::MissingVerifier`] when no sign-in was started in this
    /// browser; [`BackendError::Status`] when the backend rejects the code.
    pub async fn complete_oauth(&self, code: &str) -> Result<Session, BackendError> {
        let verifier = self.inner.vault.get(VERIFIER_KEY)?.ok_or(BackendError::MissingVerifier)?;
        self.inner.vault.remove(VERIFIER_KEY)?;

        let grant = self.inner.client.pkce_grant(code, &verifier).await?;
        let session = self.adopt(grant)?;
        tracing::info!(user_id = session.user_id(), "signed in with oauth");
        self.inner.events.emit(&SessionEvent::signed_in(session.clone()));
        Ok(session)
    }

    /// Access token for the current grant, refreshing it first if needed.
    ///
    /// # Errors
    ///
    /// Same as [`HostedAuth::current_grant`].
    pub async fn access_token(&self) -> Result<Option<String>, BackendError> {
        Ok(self.current_grant().await?.map(|grant| grant.access_token))
    }

    /// Current grant, refreshed when within the refresh margin of expiry.
    ///
    /// # Errors
    ///
    /// Transport failures while refreshing. A refresh the backend rejects is
    /// not an error: it ends the session and yields `None`.
    pub async fn current_grant(&self) -> Result<Option<StoredGrant>, BackendError> {
        match self.load()? {
            Some(grant) if grant.needs_refresh(self.inner.clock.now_epoch_secs()) => {}
            other => return Ok(other),
        }

        let _refreshing = self.inner.refresh_lock.lock().await;
        // Another caller may have refreshed while this one waited.
        let Some(grant) = self.load()? else {
            return Ok(None);
        };
        if !grant.needs_refresh(self.inner.clock.now_epoch_secs()) {
            return Ok(Some(grant));
        }

        match self.inner.client.refresh_grant(&grant.refresh_token).await {
            Ok(fresh) => {
                let stored = self.store(fresh)?;
                if let Ok(session) = stored.session() {
                    self.inner.events.emit(&SessionEvent::token_refreshed(session));
                }
                Ok(Some(stored))
            }
            Err(e) if e.is_auth_rejection() => self.end_rejected(&grant.refresh_token, &e),
            Err(e) => Err(e),
        }
    }

    /// Drop the stored grant after the backend refused `rejected`, unless the
    /// vault already holds a newer one written by another tab.
    fn end_rejected(&self, rejected: &str, error: &BackendError) -> Result<Option<StoredGrant>, BackendError> {
        let current = self.load()?;
        if current.as_ref().is_some_and(|g| g.refresh_token != rejected) {
            tracing::debug!(error = %error, "refresh rejected but vault was rotated elsewhere");
            return Ok(current);
        }
        tracing::warn!(error = %error, "refresh rejected, ending session");
        self.inner.vault.remove(GRANT_KEY)?;
        self.inner.events.emit(&SessionEvent::signed_out());
        Ok(None)
    }

    pub(crate) fn notify(&self, event: &SessionEvent) {
        self.inner.events.emit(event);
    }

    fn load(&self) -> Result<Option<StoredGrant>, BackendError> {
        let Some(raw) = self.inner.vault.get(GRANT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(grant) => Ok(Some(grant)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored grant");
                self.inner.vault.remove(GRANT_KEY)?;
                Ok(None)
            }
        }
    }

    fn store(&self, grant: TokenGrant) -> Result<StoredGrant, BackendError> {
        let stored = StoredGrant::from_grant(grant, self.inner.clock.now_epoch_secs());
        let raw = serde_json::to_string(&stored)?;
        self.inner.vault.set(GRANT_KEY, &raw)?;
        Ok(stored)
    }

    fn adopt(&self, grant: TokenGrant) -> Result<Session, BackendError> {
        let stored = self.store(grant)?;
        stored.session().map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl SessionStore for HostedAuth {
    async fn current_session(&self) -> Result<Option<Session>, GateError> {
        let grant = self.current_grant().await.map_err(BackendError::into_session_error)?;
        grant.as_ref().map(StoredGrant::session).transpose()
    }

    async fn sign_out(&self) -> Result<(), GateError> {
        let grant = self.load().map_err(BackendError::into_session_error)?;
        self.inner.vault.remove(GRANT_KEY).map_err(BackendError::into_session_error)?;
        let Some(grant) = grant else {
            return Ok(());
        };
        self.inner.events.emit(&SessionEvent::signed_out());
        tracing::info!(user_id = %grant.user_id, "signed out");

        self.inner
            .client
            .logout(&grant.access_token)
            .await
            .map_err(BackendError::into_session_error)
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.inner.events.subscribe(listener)
    }
}

impl std::fmt::Debug for HostedAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedAuth")
            .field("base_url", &self.inner.client.config().base_url)
            .field("listeners", &self.inner.events.listener_count())
            .finish_non_exhaustive()
    }
}
