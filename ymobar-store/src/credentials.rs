//! Remembered login credentials.
//!
//! The identifier and secret are stored as two entries of one keychain
//! service:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! An in-memory store stands in when the keychain is unavailable or unwanted.

use std::sync::{Mutex, PoisonError};

use keyring::Entry;
use tracing::{debug, warn};
use ymobar_core::SessionCredentials;

use crate::error::StoreError;

/// Keychain service name.
pub const KEYCHAIN_SERVICE: &str = "ymobar";

/// Keychain account names.
pub mod accounts {
    /// Account holding the login identifier.
    pub const IDENTIFIER: &str = "identifier";
    /// Account holding the login secret.
    pub const SECRET: &str = "secret";
}

// ============================================================================
// Credential Store Trait
// ============================================================================

/// Storage for the credentials replayed by automatic login and relogin.
pub trait CredentialStore: Send + Sync {
    /// Stored identifier, if any.
    fn identifier(&self) -> Option<String>;

    /// Stored secret, if any.
    fn secret(&self) -> Option<String>;

    /// Stores both values, replacing previous ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Keychain`] if the backend refuses the write.
    fn save(&self, identifier: &str, secret: &str) -> Result<(), StoreError>;

    /// Removes both values. Missing values are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Keychain`] if the backend refuses the delete.
    fn clear(&self) -> Result<(), StoreError>;

    /// Stored credentials, only when both values are non-blank.
    fn load(&self) -> Option<SessionCredentials> {
        let credentials = SessionCredentials::new(self.identifier()?, self.secret()?);
        credentials.is_complete().then_some(credentials)
    }
}

// ============================================================================
// Keychain
// ============================================================================

/// Credential store backed by the system keychain.
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service: String,
}

impl KeychainCredentialStore {
    /// Creates a store under the [`KEYCHAIN_SERVICE`] service.
    pub fn new() -> Self {
        Self::with_service(KEYCHAIN_SERVICE)
    }

    /// Creates a store under a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// The keychain service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, account: &str) -> Result<Entry, StoreError> {
        Entry::new(&self.service, account)
            .map_err(|e| StoreError::Keychain(format!("failed to open entry {account}: {e}")))
    }

    fn read(&self, account: &str) -> Option<String> {
        let entry = match self.entry(account) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(account, error = %e, "Keychain unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(value) if !value.is_empty() => Some(value),
            Ok(_) | Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(account, error = %e, "Keychain read failed");
                None
            }
        }
    }

    fn delete(&self, account: &str) -> Result<(), StoreError> {
        match self.entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Keychain(format!(
                "failed to delete {account}: {e}"
            ))),
        }
    }
}

impl Default for KeychainCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for KeychainCredentialStore {
    fn identifier(&self) -> Option<String> {
        self.read(accounts::IDENTIFIER)
    }

    fn secret(&self) -> Option<String> {
        self.read(accounts::SECRET)
    }

    fn save(&self, identifier: &str, secret: &str) -> Result<(), StoreError> {
        self.entry(accounts::IDENTIFIER)?.set_password(identifier)?;
        self.entry(accounts::SECRET)?.set_password(secret)?;
        debug!(service = %self.service, "Credentials stored in keychain");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        // Attempt both even if the first fails.
        let identifier = self.delete(accounts::IDENTIFIER);
        let secret = self.delete(accounts::SECRET);
        identifier.and(secret)?;
        debug!(service = %self.service, "Credentials removed from keychain");
        Ok(())
    }
}

// ============================================================================
// In-Memory
// ============================================================================

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<(String, String)>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `identifier` and `secret`.
    pub fn with_credentials(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(Some((identifier.into(), secret.into()))),
        }
    }

    fn snapshot(&self) -> Option<(String, String)> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn identifier(&self) -> Option<String> {
        self.snapshot().map(|(identifier, _)| identifier)
    }

    fn secret(&self) -> Option<String> {
        self.snapshot().map(|(_, secret)| secret)
    }

    fn save(&self, identifier: &str, secret: &str) -> Result<(), StoreError> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((identifier.to_string(), secret.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
