//! # client
//!
//! Leptos + WASM front-end for Agora. Pages are wrapped in the
//! authorization gate from the `gate` crate and talk to the hosted backend
//! through the `backend` crate; nothing here owns auth logic of its own.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install browser logging and hydrate the SSR markup.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
