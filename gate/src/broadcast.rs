//! Listener registry for session-change notifications.
//!
//! Session store adapters embed a [`SessionBroadcaster`] and call
//! [`SessionBroadcaster::emit`] after every sign-in, sign-out and refresh.
//! Listeners are invoked outside the registry lock, so a listener may
//! subscribe or unsubscribe from inside its own callback.

#[cfg(test)]
#[path = "broadcast_test.rs"]
mod broadcast_test;

use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::ports::{SessionListener, Subscription};
use crate::session::SessionEvent;

type SharedListener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, SharedListener)>,
}

#[derive(Clone, Default)]
pub struct SessionBroadcaster {
    inner: Arc<Mutex<Registry>>,
}

impl SessionBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; the returned handle removes it again.
    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let id = {
            let mut registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::from(listener)));
            id
        };

        let weak: Weak<Mutex<Registry>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut registry = inner.lock().unwrap_or_else(PoisonError::into_inner);
                registry.listeners.retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Deliver `event` to every listener registered at the time of the call.
    pub fn emit(&self, event: &SessionEvent) {
        let listeners: Vec<SharedListener> = {
            let registry = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            registry.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        tracing::debug!(kind = ?event.kind, listeners = listeners.len(), "session event");
        for listener in listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).listeners.len()
    }
}

impl std::fmt::Debug for SessionBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBroadcaster").field("listeners", &self.listener_count()).finish()
    }
}
