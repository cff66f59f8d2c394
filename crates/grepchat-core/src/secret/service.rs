//! Secret management service.
//!
//! SecretService resolves secrets through a chain of providers in priority
//! order (first match wins). The default chain built in grepchat-infra is
//! `[EnvSecretProvider, KeychainProvider]`.

use tracing::debug;

use grepchat_types::error::SecretError;

use super::provider::DynSecretProvider;

pub struct SecretService {
    providers: Vec<DynSecretProvider>,
}

impl SecretService {
    /// Providers must be ordered by precedence, highest first.
    pub fn new(providers: Vec<DynSecretProvider>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve a secret value, first match wins.
    pub async fn get_secret(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.resolve(key).await?.map(|(_, value)| value))
    }

    /// Like [`Self::get_secret`] but a missing key is an error.
    pub async fn require_secret(&self, key: &str) -> Result<String, SecretError> {
        self.get_secret(key)
            .await?
            .ok_or_else(|| SecretError::NotFound(key.to_string()))
    }

    /// Name of the provider that currently supplies `key`, if any.
    pub async fn resolve_source(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.resolve(key).await?.map(|(name, _)| name))
    }

    async fn resolve(&self, key: &str) -> Result<Option<(String, String)>, SecretError> {
        for provider in &self.providers {
            if let Some(value) = provider.get_boxed(key).await? {
                debug!(key, provider = provider.name(), "Secret resolved");
                return Ok(Some((provider.name().to_string(), value)));
            }
        }
        Ok(None)
    }

    /// Store a secret in the first writable provider.
    ///
    /// Returns the name of the provider that accepted the write.
    pub async fn set_secret(&self, key: &str, value: &str) -> Result<String, SecretError> {
        for provider in &self.providers {
            match provider.set_boxed(key, value).await {
                Ok(()) => return Ok(provider.name().to_string()),
                Err(SecretError::ReadOnly) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(SecretError::ReadOnly)
    }

    /// Delete a secret from every provider that has it.
    ///
    /// `NotFound` only when no provider held the key.
    pub async fn delete_secret(&self, key: &str) -> Result<(), SecretError> {
        let mut deleted = false;

        for provider in &self.providers {
            match provider.delete_boxed(key).await {
                Ok(()) => deleted = true,
                Err(SecretError::NotFound(_)) | Err(SecretError::ReadOnly) => continue,
                Err(e) => return Err(e),
            }
        }

        if !deleted {
            return Err(SecretError::NotFound(key.to_string()));
        }
        Ok(())
    }

    /// Mask a secret value, showing only the last 4 characters.
    ///
    /// - "gk-abcdefghijklmnop" -> "****mnop"
    /// - "abc" -> "****"
    pub fn mask_secret(value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.len() <= 4 {
            "****".to_string()
        } else {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("****{tail}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::provider::SecretProvider;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct MockProvider {
        name: &'static str,
        values: Mutex<HashMap<String, String>>,
        writable: bool,
    }

    impl MockProvider {
        fn new(name: &'static str, writable: bool) -> Self {
            Self {
                name,
                values: Mutex::new(HashMap::new()),
                writable,
            }
        }

        fn with_value(self, key: &str, value: &str) -> Self {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            self
        }
    }

    impl SecretProvider for MockProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
            if !self.writable {
                return Err(SecretError::ReadOnly);
            }
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), SecretError> {
            if !self.writable {
                return Err(SecretError::ReadOnly);
            }
            self.values
                .lock()
                .unwrap()
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| SecretError::NotFound(key.to_string()))
        }
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(SecretService::mask_secret("gk-abcdefghijklmnop"), "****mnop");
        assert_eq!(SecretService::mask_secret("abc"), "****");
        assert_eq!(SecretService::mask_secret("abcd"), "****");
    }

    #[tokio::test]
    async fn test_env_takes_precedence_over_keychain() {
        let service = SecretService::new(vec![
            Arc::new(MockProvider::new("env", false).with_value("GREPTILE_API_KEY", "from-env")),
            Arc::new(MockProvider::new("keychain", true).with_value("GREPTILE_API_KEY", "from-kc")),
        ]);

        assert_eq!(
            service.get_secret("GREPTILE_API_KEY").await.unwrap(),
            Some("from-env".to_string())
        );
        assert_eq!(
            service.resolve_source("GREPTILE_API_KEY").await.unwrap(),
            Some("env".to_string())
        );
    }

    #[test]
    fn test_provider_names_in_chain_order() {
        let service = SecretService::new(vec![
            Arc::new(MockProvider::new("env", false)),
            Arc::new(MockProvider::new("keychain", true)),
        ]);
        assert_eq!(service.provider_names(), vec!["env", "keychain"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_keychain() {
        let service = SecretService::new(vec![
            Arc::new(MockProvider::new("env", false)),
            Arc::new(MockProvider::new("keychain", true).with_value("GITHUB_CLIENT_ID", "abc")),
        ]);

        assert_eq!(service.require_secret("GITHUB_CLIENT_ID").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_require_missing_secret_is_not_found() {
        let service = SecretService::new(vec![Arc::new(MockProvider::new("env", false))]);

        let err = service.require_secret("GITHUB_CLIENT_SECRET").await.unwrap_err();
        assert!(matches!(err, SecretError::NotFound(k) if k == "GITHUB_CLIENT_SECRET"));
    }

    #[tokio::test]
    async fn test_set_skips_readonly_provider() {
        let service = SecretService::new(vec![
            Arc::new(MockProvider::new("env", false)),
            Arc::new(MockProvider::new("keychain", true)),
        ]);

        let written_to = service.set_secret("GREPTILE_API_KEY", "k").await.unwrap();
        assert_eq!(written_to, "keychain");
        assert_eq!(
            service.get_secret("GREPTILE_API_KEY").await.unwrap(),
            Some("k".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_fails_without_writable_provider() {
        let service = SecretService::new(vec![Arc::new(MockProvider::new("env", false))]);

        assert!(matches!(
            service.set_secret("KEY", "v").await,
            Err(SecretError::ReadOnly)
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let service = SecretService::new(vec![
            Arc::new(MockProvider::new("env", false)),
            Arc::new(MockProvider::new("keychain", true)),
        ]);

        assert!(matches!(
            service.delete_secret("NOPE").await,
            Err(SecretError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let service = SecretService::new(vec![Arc::new(
            MockProvider::new("keychain", true).with_value("KEY", "v"),
        )]);

        service.delete_secret("KEY").await.unwrap();
        assert_eq!(service.get_secret("KEY").await.unwrap(), None);
    }
}
