//! Browser implementations of the backend and gate seams.

use std::time::Duration;

use backend::{BackendError, Clock, TokenVault};

/// `window.localStorage`, looked up on every call so the vault itself holds
/// no JS handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageVault;

impl LocalStorageVault {
    fn storage() -> Result<web_sys::Storage, BackendError> {
        web_sys::window()
            .ok_or_else(|| BackendError::Vault("no window".into()))?
            .local_storage()
            .map_err(|_| BackendError::Vault("localStorage access denied".into()))?
            .ok_or_else(|| BackendError::Vault("localStorage unavailable".into()))
    }
}

impl TokenVault for LocalStorageVault {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| BackendError::Vault(format!("read {key} failed")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|_| BackendError::Vault(format!("write {key} failed")))
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|_| BackendError::Vault(format!("remove {key} failed")))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn now_epoch_secs(&self) -> u64 {
        (js_sys::Date::now() / 1000.0) as u64
    }
}

/// Gate timer over `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

#[async_trait::async_trait(?Send)]
impl gate::Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
