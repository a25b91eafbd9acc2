//! In-memory fakes for the gate's ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::broadcast::SessionBroadcaster;
use crate::error::GateError;
use crate::ports::{Navigator, SessionListener, SessionStore, Subscription, Timer, UserDirectory};
use crate::session::{ApplicationUser, Session, SessionEvent};

pub fn session(user_id: &str) -> Session {
    Session::new(user_id, Some(format!("{user_id}@example.com"))).unwrap()
}

pub fn row(user_id: &str) -> ApplicationUser {
    ApplicationUser {
        id: user_id.to_owned(),
        display_name: format!("User {user_id}"),
        bio: None,
        avatar_url: None,
        created_at: Some("2024-01-01T00:00:00Z".to_owned()),
    }
}

// =============================================================================
// SESSION STORE
// =============================================================================

#[derive(Clone)]
pub struct FakeSessionStore {
    current: Arc<Mutex<Result<Option<Session>, GateError>>>,
    sign_out_result: Arc<Mutex<Result<(), GateError>>>,
    pub lookups: Arc<AtomicUsize>,
    pub sign_outs: Arc<AtomicUsize>,
    pub events: SessionBroadcaster,
    hold: Option<Arc<Notify>>,
}

impl FakeSessionStore {
    pub fn signed_out() -> Self {
        Self::with_result(Ok(None))
    }

    pub fn signed_in(user_id: &str) -> Self {
        Self::with_result(Ok(Some(session(user_id))))
    }

    pub fn failing(error: GateError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<Option<Session>, GateError>) -> Self {
        Self {
            current: Arc::new(Mutex::new(result)),
            sign_out_result: Arc::new(Mutex::new(Ok(()))),
            lookups: Arc::new(AtomicUsize::new(0)),
            sign_outs: Arc::new(AtomicUsize::new(0)),
            events: SessionBroadcaster::new(),
            hold: None,
        }
    }

    /// Block `current_session` until `notify` fires.
    pub fn held_by(mut self, notify: Arc<Notify>) -> Self {
        self.hold = Some(notify);
        self
    }

    pub fn failing_sign_out(self, error: GateError) -> Self {
        *self.sign_out_result.lock().unwrap() = Err(error);
        self
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.current.lock().unwrap() = Ok(session);
    }

    /// Change the session and notify subscribers, like a real sign-in/out.
    pub fn emit(&self, event: SessionEvent) {
        self.set_session(event.session.clone());
        self.events.emit(&event);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for FakeSessionStore {
    async fn current_session(&self) -> Result<Option<Session>, GateError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        self.current.lock().unwrap().clone()
    }

    async fn sign_out(&self) -> Result<(), GateError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        let result = self.sign_out_result.lock().unwrap().clone();
        if result.is_ok() {
            self.set_session(None);
        }
        result
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.events.subscribe(listener)
    }
}

// =============================================================================
// DIRECTORY
// =============================================================================

#[derive(Clone, Default)]
pub struct FakeDirectory {
    rows: Arc<Mutex<HashMap<String, ApplicationUser>>>,
    failure: Arc<Mutex<Option<GateError>>>,
    pub queries: Arc<AtomicUsize>,
}

impl FakeDirectory {
    pub fn with_rows(ids: &[&str]) -> Self {
        let directory = Self::default();
        for id in ids {
            directory.insert(row(id));
        }
        directory
    }

    pub fn failing(error: GateError) -> Self {
        let directory = Self::default();
        *directory.failure.lock().unwrap() = Some(error);
        directory
    }

    pub fn insert(&self, row: ApplicationUser) {
        self.rows.lock().unwrap().insert(row.id.clone(), row);
    }

    /// Store `row` under a key other than its own id.
    pub fn insert_under(&self, key: &str, row: ApplicationUser) {
        self.rows.lock().unwrap().insert(key.to_owned(), row);
    }

    pub fn remove(&self, id: &str) {
        self.rows.lock().unwrap().remove(id);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn user_by_id(&self, id: &str) -> Result<Option<ApplicationUser>, GateError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }
}

// =============================================================================
// NAVIGATOR / TIMER
// =============================================================================

#[derive(Clone, Default)]
pub struct RecordingNavigator {
    targets: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.targets.lock().unwrap().push(target.to_owned());
    }
}

pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
