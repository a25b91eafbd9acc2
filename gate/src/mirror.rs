//! Continuously refreshed view of the current session and profile.
//!
//! DESIGN
//! ======
//! [`SessionMirror::run`] is the only writer of the snapshot. It subscribes
//! to the session store on start, funnels every change notification through
//! one channel, and handles them in order, so the published snapshot always
//! reflects the latest event. Readers hold a [`MirrorHandle`]; teardown goes
//! through [`MirrorHandle::shutdown`], which ends the loop and drops the
//! store subscription.
//!
//! Unlike the gate, the mirror never redirects. A session whose profile row
//! is missing simply mirrors as `profile: None`.

#[cfg(test)]
#[path = "mirror_test.rs"]
mod mirror_test;

use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use futures::channel::mpsc;

use crate::ports::{SessionStore, UserDirectory};
use crate::session::{ApplicationUser, Session, SessionEvent};

/// Shared projection of the session store for rendering code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MirrorSnapshot {
    pub user: Option<Session>,
    pub profile: Option<ApplicationUser>,
    pub loading: bool,
}

impl Default for MirrorSnapshot {
    fn default() -> Self {
        Self { user: None, profile: None, loading: true }
    }
}

impl MirrorSnapshot {
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

enum MirrorMessage {
    Changed(SessionEvent),
    Shutdown,
}

type SnapshotObserver = Box<dyn Fn(&MirrorSnapshot) + Send + Sync>;

pub struct SessionMirror<S, D> {
    sessions: S,
    directory: D,
    snapshot: Arc<Mutex<MirrorSnapshot>>,
    observer: Option<SnapshotObserver>,
    tx: mpsc::UnboundedSender<MirrorMessage>,
    rx: mpsc::UnboundedReceiver<MirrorMessage>,
}

/// Read side of a running mirror.
#[derive(Clone)]
pub struct MirrorHandle {
    snapshot: Arc<Mutex<MirrorSnapshot>>,
    tx: mpsc::UnboundedSender<MirrorMessage>,
}

impl MirrorHandle {
    #[must_use]
    pub fn snapshot(&self) -> MirrorSnapshot {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Stop the mirror loop; its store subscription is cancelled on exit.
    pub fn shutdown(&self) {
        let _ = self.tx.unbounded_send(MirrorMessage::Shutdown);
    }
}

impl<S, D> SessionMirror<S, D>
where
    S: SessionStore,
    D: UserDirectory,
{
    pub fn new(sessions: S, directory: D) -> Self {
        let (tx, rx) = mpsc::unbounded();
        Self {
            sessions,
            directory,
            snapshot: Arc::new(Mutex::new(MirrorSnapshot::default())),
            observer: None,
            tx,
            rx,
        }
    }

    /// Report every published snapshot to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Fn(&MirrorSnapshot) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    #[must_use]
    pub fn handle(&self) -> MirrorHandle {
        MirrorHandle { snapshot: Arc::clone(&self.snapshot), tx: self.tx.clone() }
    }

    /// Subscribe, load the initial state, then follow session changes until
    /// [`MirrorHandle::shutdown`] is called.
    pub async fn run(mut self) {
        let tx = self.tx.clone();
        let subscription = self.sessions.subscribe(Box::new(move |event| {
            let _ = tx.unbounded_send(MirrorMessage::Changed(event.clone()));
        }));

        self.initial_load().await;

        while let Some(message) = self.rx.next().await {
            match message {
                MirrorMessage::Changed(event) => self.apply(event).await,
                MirrorMessage::Shutdown => break,
            }
        }

        subscription.cancel();
        tracing::debug!("session mirror stopped");
    }

    async fn initial_load(&self) {
        let user = match self.sessions.current_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "initial session load failed; mirroring signed-out state");
                None
            }
        };
        let profile = self.profile_for(user.as_ref()).await;
        self.publish(MirrorSnapshot { user, profile, loading: false });
    }

    async fn apply(&self, event: SessionEvent) {
        tracing::debug!(kind = ?event.kind, "mirroring session change");
        let user = event.session;
        if user.is_some() {
            let mut refreshing = self.current();
            refreshing.loading = true;
            self.publish(refreshing);
        }
        let profile = self.profile_for(user.as_ref()).await;
        self.publish(MirrorSnapshot { user, profile, loading: false });
    }

    async fn profile_for(&self, session: Option<&Session>) -> Option<ApplicationUser> {
        let session = session?;
        match self.directory.user_by_id(session.user_id()).await {
            Ok(Some(row)) if row.matches(session) => Some(row),
            Ok(_) => {
                tracing::warn!(user_id = %session.user_id(), "no application profile for signed-in user");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id = %session.user_id(), "profile refresh failed");
                None
            }
        }
    }

    fn current(&self) -> MirrorSnapshot {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn publish(&self, next: MirrorSnapshot) {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = next.clone();
        if let Some(observer) = &self.observer {
            observer(&next);
        }
    }
}
