//! Shared application state.
//!
//! DESIGN
//! ======
//! The server holds no sessions; the browser talks to the hosted backend
//! directly. State only records what the health check reports.

use std::sync::Arc;

use backend::BackendConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Backend settings seen at startup. `None` means the browser bundle
    /// was most likely built without them too.
    pub backend: Option<Arc<BackendConfig>>,
}

impl AppState {
    pub fn new(backend: Option<BackendConfig>) -> Self {
        Self { backend: backend.map(Arc::new) }
    }
}
