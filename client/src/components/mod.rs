//! Reusable UI component modules.

pub mod auth_gate;
pub mod loading;
