//! Secret provider trait and its object-safe wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use grepchat_types::error::SecretError;

/// A backend that stores secret values by key (environment, OS keychain).
pub trait SecretProvider: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when this provider does not hold `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SecretError>> + Send;

    /// Read-only providers return `SecretError::ReadOnly`.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), SecretError>> + Send;

    /// `SecretError::NotFound` when the key is absent.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), SecretError>> + Send;
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of [`SecretProvider`] with boxed futures.
pub trait SecretProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn get_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, SecretError>>;

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), SecretError>>;

    fn delete_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), SecretError>>;
}

impl<T: SecretProvider> SecretProviderDyn for T {
    fn name(&self) -> &str {
        SecretProvider::name(self)
    }

    fn get_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, SecretError>> {
        Box::pin(self.get(key))
    }

    fn set_boxed<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> BoxFuture<'a, Result<(), SecretError>> {
        Box::pin(self.set(key, value))
    }

    fn delete_boxed<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), SecretError>> {
        Box::pin(self.delete(key))
    }
}

/// Type-erased provider, as stored in a [`super::service::SecretService`] chain.
pub type DynSecretProvider = Arc<dyn SecretProviderDyn>;
