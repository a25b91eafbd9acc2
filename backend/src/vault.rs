//! Local persistence for the token grant and the pending PKCE verifier.
//!
//! The browser keeps these in `localStorage` so a reload stays signed in;
//! everywhere else [`MemoryVault`] is enough.

#[cfg(test)]
#[path = "vault_test.rs"]
mod vault_test;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::BackendError;

/// Key holding the serialized [`crate::StoredGrant`].
pub const GRANT_KEY: &str = "agora.auth.grant";
/// Key holding the PKCE verifier between authorize and code exchange.
pub const VERIFIER_KEY: &str = "agora.auth.pkce_verifier";

/// String key/value store for auth material.
pub trait TokenVault: Send + Sync {
    /// # Errors
    ///
    /// [`BackendError::Vault`] when the underlying storage is unavailable.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// # Errors
    ///
    /// [`BackendError::Vault`] when the underlying storage rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// # Errors
    ///
    /// [`BackendError::Vault`] when the underlying storage is unavailable.
    fn remove(&self, key: &str) -> Result<(), BackendError>;
}

#[derive(Debug, Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenVault for MemoryVault {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.entries().remove(key);
        Ok(())
    }
}
