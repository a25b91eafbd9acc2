//! One-shot authorization decision for a page mount.
//!
//! ARCHITECTURE
//! ============
//! A page creates a [`Mount`] when it appears and hands it to
//! [`AuthGate::evaluate`]. The gate walks `Pending -> Allowed | Denied`
//! exactly once per mount:
//!
//! 1. ask the session store for the current session (failure = no session);
//! 2. branch on the page's [`Requirement`];
//! 3. for `RequireAuth` with a session, confirm the directory still has the
//!    user's row, signing out and redirecting when it does not.
//!
//! Every state transition and every side effect (sign-out, navigation) is
//! preceded by an abort-flag check, so a page that unmounts mid-flight sees
//! no updates and issues no redirect.
//!
//! TRADE-OFFS
//! ==========
//! The gate never re-validates after its first decision and ignores later
//! session-change events; [`crate::SessionMirror`] is the continuous
//! listener. There is no timeout of its own: a query that never resolves
//! leaves the mount `Pending`.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::config::{ForbidErrorPolicy, GateConfig};
use crate::error::GateError;
use crate::ports::{Navigator, SessionStore, Timer, UserDirectory};
use crate::session::Session;

// =============================================================================
// POLICY
// =============================================================================

/// Whether a page needs a signed-in visitor or must not have one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    #[default]
    RequireAuth,
    /// Public-only pages such as login and registration.
    ForbidAuth,
}

/// Per-page gate parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GatePolicy {
    pub requirement: Requirement,
    /// Where to send denied visitors; falls back to the configured default.
    pub redirect: Option<String>,
}

impl GatePolicy {
    #[must_use]
    pub fn require_auth() -> Self {
        Self { requirement: Requirement::RequireAuth, redirect: None }
    }

    #[must_use]
    pub fn forbid_auth() -> Self {
        Self { requirement: Requirement::ForbidAuth, redirect: None }
    }

    #[must_use]
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    fn target<'a>(&'a self, config: &'a GateConfig) -> &'a str {
        match (&self.redirect, self.requirement) {
            (Some(target), _) => target,
            (None, Requirement::RequireAuth) => &config.login_path,
            (None, Requirement::ForbidAuth) => &config.home_path,
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateState {
    #[default]
    Pending,
    Allowed,
    Denied,
}

impl GateState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Outcome reported to the caller of [`AuthGate::evaluate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Denied; a navigation to the contained target has been issued.
    Redirect(String),
    /// No terminal state was reached: the mount went away first, or another
    /// evaluation of the same mount is still in flight.
    Pending,
}

type StateObserver = Box<dyn Fn(GateState) + Send + Sync>;

struct MountInner {
    mounted: AtomicBool,
    started: AtomicBool,
    state: Mutex<(GateState, Option<String>)>,
    observer: Option<StateObserver>,
}

/// State and abort flag owned by one page instance.
///
/// Cloning shares the same mount; the page keeps one clone to unmount on
/// teardown while the in-flight evaluation holds another.
#[derive(Clone)]
pub struct Mount {
    inner: Arc<MountInner>,
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

impl Mount {
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A mount that reports every state transition to `observer`.
    pub fn with_observer(observer: impl Fn(GateState) + Send + Sync + 'static) -> Self {
        Self::build(Some(Box::new(observer)))
    }

    fn build(observer: Option<StateObserver>) -> Self {
        Self {
            inner: Arc::new(MountInner {
                mounted: AtomicBool::new(true),
                started: AtomicBool::new(false),
                state: Mutex::new((GateState::Pending, None)),
                observer,
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner).0
    }

    #[must_use]
    pub fn decision(&self) -> Decision {
        let guard = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &*guard {
            (GateState::Allowed, _) => Decision::Allow,
            (GateState::Denied, Some(target)) => Decision::Redirect(target.clone()),
            _ => Decision::Pending,
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    /// Raise the abort flag. Idempotent.
    pub fn unmount(&self) {
        self.inner.mounted.store(false, Ordering::SeqCst);
    }

    /// Claim the mount's single evaluation. `false` if already claimed.
    fn begin(&self) -> bool {
        !self.inner.started.swap(true, Ordering::SeqCst)
    }

    /// Move out of `Pending`. Refused once unmounted or already terminal.
    fn transition(&self, to: GateState, redirect: Option<String>) -> bool {
        if !self.is_mounted() {
            return false;
        }
        {
            let mut guard = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
            if guard.0.is_terminal() {
                return false;
            }
            *guard = (to, redirect);
        }
        if let Some(observer) = &self.inner.observer {
            observer(to);
        }
        true
    }
}

impl std::fmt::Debug for Mount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mount")
            .field("mounted", &self.is_mounted())
            .field("state", &self.state())
            .finish()
    }
}

// =============================================================================
// GATE
// =============================================================================

enum Verdict {
    Allow,
    Deny,
}

/// The authorization gate. One instance can serve any number of mounts;
/// all per-page state lives in [`Mount`].
pub struct AuthGate<S, D, N> {
    sessions: S,
    directory: D,
    navigator: N,
    config: GateConfig,
    timer: Option<Arc<dyn Timer>>,
}

impl<S, D, N> AuthGate<S, D, N>
where
    S: SessionStore,
    D: UserDirectory,
    N: Navigator,
{
    pub fn new(sessions: S, directory: D, navigator: N, config: GateConfig) -> Self {
        Self { sessions, directory, navigator, config, timer: None }
    }

    /// Enable the configured minimum loading time using `timer`.
    #[must_use]
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = Some(timer);
        self
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Decide whether the page behind `mount` may render.
    ///
    /// Runs at most once per mount; later calls return the mount's current
    /// decision without touching the stores.
    pub async fn evaluate(&self, policy: &GatePolicy, mount: &Mount) -> Decision {
        if !mount.begin() {
            tracing::debug!("gate already evaluated for this mount");
            return mount.decision();
        }
        if !mount.is_mounted() {
            return Decision::Pending;
        }

        let verdict = match (self.config.min_pending, &self.timer) {
            (Some(min), Some(timer)) => {
                let (verdict, ()) = futures::join!(self.resolve(policy, mount), timer.sleep(min));
                verdict
            }
            _ => self.resolve(policy, mount).await,
        };

        match verdict {
            Verdict::Allow => {
                if mount.transition(GateState::Allowed, None) {
                    tracing::debug!(requirement = ?policy.requirement, "gate allowed");
                    Decision::Allow
                } else {
                    Decision::Pending
                }
            }
            Verdict::Deny => {
                let target = policy.target(&self.config).to_owned();
                if !mount.transition(GateState::Denied, Some(target.clone())) {
                    return Decision::Pending;
                }
                tracing::info!(requirement = ?policy.requirement, %target, "gate denied; redirecting");
                self.navigator.navigate(&target);
                Decision::Redirect(target)
            }
        }
    }

    async fn resolve(&self, policy: &GatePolicy, mount: &Mount) -> Verdict {
        let session = match self.sessions.current_session().await {
            Ok(session) => session,
            Err(e) if e.is_unexpected() => return self.unexpected(policy.requirement, &e),
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed; treating visitor as signed out");
                None
            }
        };

        match (policy.requirement, session) {
            (Requirement::RequireAuth, None) | (Requirement::ForbidAuth, Some(_)) => Verdict::Deny,
            (Requirement::ForbidAuth, None) => Verdict::Allow,
            (Requirement::RequireAuth, Some(session)) => self.confirm_identity(&session, mount).await,
        }
    }

    async fn confirm_identity(&self, session: &Session, mount: &Mount) -> Verdict {
        let failure = match self.directory.user_by_id(session.user_id()).await {
            Ok(Some(row)) if row.matches(session) => return Verdict::Allow,
            Ok(Some(row)) => GateError::Unexpected(format!("directory returned row {} for {}", row.id, session.user_id())),
            Ok(None) => GateError::Query(format!("no application user for {}", session.user_id())),
            Err(e) => e,
        };
        tracing::warn!(error = %failure, user_id = %session.user_id(), "identity confirmation failed; signing out");

        if mount.is_mounted() {
            if let Err(e) = self.sessions.sign_out().await {
                tracing::warn!(error = %e, user_id = %session.user_id(), "best-effort sign-out failed");
            }
        }
        Verdict::Deny
    }

    fn unexpected(&self, requirement: Requirement, error: &GateError) -> Verdict {
        match (requirement, self.config.forbid_on_error) {
            (Requirement::RequireAuth, _) => {
                tracing::error!(error = %error, "unexpected session failure; denying");
                Verdict::Deny
            }
            (Requirement::ForbidAuth, ForbidErrorPolicy::Allow) => {
                tracing::warn!(error = %error, "unexpected session failure on public page; failing open");
                Verdict::Allow
            }
            (Requirement::ForbidAuth, ForbidErrorPolicy::Deny) => {
                tracing::error!(error = %error, "unexpected session failure on public page; failing closed");
                Verdict::Deny
            }
        }
    }
}
