//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Pages assume the gate has already decided they may render. They call the
//! hosted backend directly for their own forms and never redirect on auth
//! state themselves, except the OAuth callback which sits outside the gate.

pub mod auth_callback;
pub mod feed;
pub mod login;
pub mod profile;
pub mod register;
