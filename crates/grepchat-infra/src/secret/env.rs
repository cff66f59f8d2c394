//! Environment variable secret provider.
//!
//! Read-only and highest priority. For a key `K` it checks `GREPCHAT_K`
//! first, then `K`. Empty values count as unset.

use grepchat_core::secret::provider::SecretProvider;
use grepchat_types::error::SecretError;

/// Prefix that scopes a variable to this application.
pub const ENV_PREFIX: &str = "GREPCHAT_";

pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    fn lookup(name: &str) -> Option<String> {
        // Non-Unicode values are treated as unset.
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for EnvSecretProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(Self::lookup(&format!("{ENV_PREFIX}{key}")).or_else(|| Self::lookup(key)))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), SecretError> {
        Err(SecretError::ReadOnly)
    }

    async fn delete(&self, _key: &str) -> Result<(), SecretError> {
        Err(SecretError::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_provider_get_existing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("GREPCHAT_TEST_SECRET_PLAIN", "plain-value") };

        let provider = EnvSecretProvider::new();
        let result = provider.get("GREPCHAT_TEST_SECRET_PLAIN").await.unwrap();
        assert_eq!(result, Some("plain-value".to_string()));

        // SAFETY: set above by this test only.
        unsafe { std::env::remove_var("GREPCHAT_TEST_SECRET_PLAIN") };
    }

    #[tokio::test]
    async fn test_prefixed_variable_wins() {
        // SAFETY: the variable names are unique to this test.
        unsafe {
            std::env::set_var("TEST_SECRET_PREFIXED_XYZ", "bare");
            std::env::set_var("GREPCHAT_TEST_SECRET_PREFIXED_XYZ", "prefixed");
        }

        let provider = EnvSecretProvider::new();
        let result = provider.get("TEST_SECRET_PREFIXED_XYZ").await.unwrap();
        assert_eq!(result, Some("prefixed".to_string()));

        // SAFETY: set above by this test only.
        unsafe {
            std::env::remove_var("TEST_SECRET_PREFIXED_XYZ");
            std::env::remove_var("GREPCHAT_TEST_SECRET_PREFIXED_XYZ");
        }
    }

    #[tokio::test]
    async fn test_empty_value_is_unset() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("TEST_SECRET_EMPTY_XYZ", "") };

        let provider = EnvSecretProvider::new();
        assert!(provider.get("TEST_SECRET_EMPTY_XYZ").await.unwrap().is_none());

        // SAFETY: set above by this test only.
        unsafe { std::env::remove_var("TEST_SECRET_EMPTY_XYZ") };
    }

    #[tokio::test]
    async fn test_env_provider_get_missing() {
        let provider = EnvSecretProvider::new();
        let result = provider.get("NONEXISTENT_VAR_XYZ_123").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_env_provider_is_read_only() {
        let provider = EnvSecretProvider::new();
        assert!(matches!(
            provider.set("KEY", "value").await,
            Err(SecretError::ReadOnly)
        ));
        assert!(matches!(
            provider.delete("KEY").await,
            Err(SecretError::ReadOnly)
        ));
    }
}
