//! Seams between the gate and the outside world.
//!
//! SYSTEM CONTEXT
//! ==============
//! The hosted backend adapters (`backend` crate) implement [`SessionStore`]
//! and [`UserDirectory`]; the Leptos router supplies a [`Navigator`]. In the
//! browser every future is `!Send`, so the async traits drop their `Send`
//! bound on `wasm32`.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::GateError;
use crate::session::{ApplicationUser, Session, SessionEvent};

/// Callback invoked for every session change.
pub type SessionListener = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Remote holder of the visitor's authentication session.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait SessionStore {
    /// Current session, if any.
    ///
    /// # Errors
    ///
    /// [`GateError::Transport`] when the store cannot be reached,
    /// [`GateError::Unexpected`] when it answers with something malformed.
    async fn current_session(&self) -> Result<Option<Session>, GateError>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// [`GateError::Transport`] when the remote sign-out fails.
    async fn sign_out(&self) -> Result<(), GateError>;

    /// Register `listener` for session changes until the returned
    /// [`Subscription`] is cancelled or dropped.
    fn subscribe(&self, listener: SessionListener) -> Subscription;
}

/// Remote relational store of application-level user rows.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait UserDirectory {
    /// # Errors
    ///
    /// [`GateError::Query`] when the lookup fails.
    async fn user_by_id(&self, id: &str) -> Result<Option<ApplicationUser>, GateError>;
}

/// Issues page navigations on behalf of the gate.
pub trait Navigator {
    fn navigate(&self, target: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str),
{
    fn navigate(&self, target: &str) {
        self(target);
    }
}

/// Runtime-specific sleep, used only for the cosmetic minimum loading time.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// Handle to a registered [`SessionListener`].
///
/// Cancelling (or dropping) the handle unregisters the listener exactly once.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A subscription that was never registered anywhere.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
    }
}
