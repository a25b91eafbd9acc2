//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure functions only, so form rules and redirect encoding stay testable
//! without a browser.

pub mod auth;
pub mod validate;
