//! Client for the hosted backend-as-a-service behind Agora.
//!
//! The hosted provider owns authentication and the relational store; this
//! crate only speaks its REST surface. [`HostedAuth`] implements
//! [`gate::SessionStore`] and [`HostedDirectory`] implements
//! [`gate::UserDirectory`], so the authorization gate and the session mirror
//! run unchanged against the real service.
//!
//! SYSTEM CONTEXT
//! ==============
//! The same code runs in the browser (wasm, `fetch` under reqwest) and
//! natively (tests, tooling). Persistence and wall-clock time are injected
//! through [`TokenVault`] and [`Clock`] so neither depends on a browser API.

pub mod auth;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod models;
pub mod pkce;
pub mod vault;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use auth::{HostedAuth, OAuthProvider, SignUpOutcome};
pub use clock::Clock;
#[cfg(not(target_arch = "wasm32"))]
pub use clock::SystemClock;
pub use config::BackendConfig;
pub use directory::HostedDirectory;
pub use error::BackendError;
pub use http::HostedClient;
pub use models::{NewProfile, ProfileUpdate, StoredGrant};
pub use vault::{MemoryVault, TokenVault};
