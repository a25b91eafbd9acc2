//! Backend wiring for the browser.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` assembles the hosted-backend handles shared through context;
//! `browser` supplies the `localStorage` vault, clock and timer they need
//! once running in WASM.

pub mod api;
#[cfg(feature = "hydrate")]
pub mod browser;
