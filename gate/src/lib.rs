//! Session-authorization gate for Agora pages.
//!
//! This crate is UI-framework agnostic: it decides whether the current
//! visitor may view a page, given a remote session store and a remote user
//! directory, and keeps a mirrored view of the session for rendering code.
//! The `client` crate binds it to Leptos; tests drive it under tokio.
//!
//! ARCHITECTURE
//! ============
//! - [`AuthGate`] runs the one-shot decision for a single page mount.
//! - [`Mount`] owns that mount's state and its abort flag.
//! - [`SessionMirror`] is the single writer of the shared session snapshot.
//! - [`SessionStore`], [`UserDirectory`], [`Navigator`] and [`Timer`] are the
//!   seams to the hosted backend, the router, and the runtime.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod gate;
pub mod mirror;
pub mod ports;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use broadcast::SessionBroadcaster;
pub use config::{ForbidErrorPolicy, GateConfig};
pub use error::GateError;
pub use gate::{AuthGate, Decision, GatePolicy, GateState, Mount, Requirement};
pub use mirror::{MirrorHandle, MirrorSnapshot, SessionMirror};
pub use ports::{Navigator, SessionListener, SessionStore, Subscription, Timer, UserDirectory};
pub use session::{ApplicationUser, Session, SessionEvent, SessionEventKind};
