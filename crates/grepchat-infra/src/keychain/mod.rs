//! OS keychain adapter for secret storage.
//!
//! Uses the `keyring` crate:
//! - macOS Keychain
//! - Linux Secret Service (GNOME Keyring, KDE Wallet)
//! - Windows Credential Manager
//!
//! Entries are stored under the service name with the secret key as the
//! user name, e.g. (`grepchat`, `GREPTILE_API_KEY`).

use grepchat_core::secret::provider::SecretProvider;
use grepchat_types::error::SecretError;

pub const DEFAULT_SERVICE: &str = "grepchat";

pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    pub fn new() -> Self {
        Self::with_service(DEFAULT_SERVICE)
    }

    /// Use a custom service name (tests, side-by-side installs).
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }


    fn entry(&self, key: &str) -> Result<keyring::Entry, SecretError> {
        keyring::Entry::new(&self.service_name, key)
            .map_err(|e| SecretError::Backend(format!("keychain entry error: {e}")))
    }
}

impl Default for KeychainProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for KeychainProvider {
    fn name(&self) -> &str {
        "keychain"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        let entry = self.entry(key)?;

        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SecretError::Backend(format!("keychain get error: {e}"))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| SecretError::Backend(format!("keychain set error: {e}")))
    }

    async fn delete(&self, key: &str) -> Result<(), SecretError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(SecretError::NotFound(key.to_string())),
            Err(e) => Err(SecretError::Backend(format!("keychain delete error: {e}"))),
        }
    }
}
