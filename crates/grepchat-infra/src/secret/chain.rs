//! Secret chain builder -- wires concrete providers in priority order.
//!
//! The resulting chain is handed to `SecretService` in `grepchat-core`
//! through the `DynSecretProvider` abstraction.

use std::sync::Arc;

use grepchat_core::secret::provider::DynSecretProvider;

use crate::keychain::KeychainProvider;
use crate::secret::env::EnvSecretProvider;

/// Build the secret resolution chain, first match wins:
/// 1. Environment variables (if `include_env`)
/// 2. OS keychain (if `keychain` is Some; may be unavailable on headless hosts)
pub fn build_secret_chain(
    keychain: Option<KeychainProvider>,
    include_env: bool,
) -> Vec<DynSecretProvider> {
    let mut chain: Vec<DynSecretProvider> = Vec::new();

    if include_env {
        chain.push(Arc::new(EnvSecretProvider::new()));
    }

    if let Some(kc) = keychain {
        chain.push(Arc::new(kc));
    }

    chain
}
