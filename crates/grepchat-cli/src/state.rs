//! Application state wiring configuration, secrets and provider clients.
//!
//! The core state machines are generic over their ports; the aliases below
//! pin them to the concrete infra implementations used by the binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use grepchat_core::auth::establisher::SessionEstablisher;
use grepchat_core::index::coordinator::IndexingCoordinator;
use grepchat_core::secret::service::SecretService;
use grepchat_core::secret::{GITHUB_CLIENT_ID, GITHUB_CLIENT_SECRET, GREPTILE_API_KEY};
use grepchat_infra::config::{load_config, resolve_data_dir};
use grepchat_infra::github::GitHubClient;
use grepchat_infra::greptile::GreptileClient;
use grepchat_infra::keychain::KeychainProvider;
use grepchat_infra::secret::chain::build_secret_chain;
use grepchat_types::config::GrepchatConfig;

use crate::cli::alerts::ConsoleNotifier;

pub type ConcreteEstablisher = SessionEstablisher<GitHubClient, Arc<ConsoleNotifier>>;

pub type ConcreteCoordinator<N = Arc<ConsoleNotifier>> = IndexingCoordinator<GreptileClient, N>;

/// Shared application state.
pub struct AppState {
    pub config: GrepchatConfig,
    pub data_dir: PathBuf,
    pub secret_service: Arc<SecretService>,
}

impl AppState {
    /// Resolve the data directory, load `config.toml` and build the secret chain.
    ///
    /// Nothing is written to disk.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;

        let secret_chain = build_secret_chain(Some(KeychainProvider::new()), true);
        let secret_service = SecretService::new(secret_chain);

        Ok(Self {
            config,
            data_dir,
            secret_service: Arc::new(secret_service),
        })
    }

    async fn require(&self, key: &str) -> anyhow::Result<String> {
        self.secret_service.require_secret(key).await.with_context(|| {
            format!("{key} is not configured. Set it in .env, export {key}, or run: grepchat secret set {key}")
        })
    }

    /// GitHub OAuth client using the app's client id and secret.
    pub async fn github_client(&self) -> anyhow::Result<GitHubClient> {
        let client_id = self.require(GITHUB_CLIENT_ID).await?;
        let client_secret = SecretString::from(self.require(GITHUB_CLIENT_SECRET).await?);
        Ok(GitHubClient::new(&self.config.github, client_id, client_secret)?)
    }

    pub async fn greptile_client(&self) -> anyhow::Result<GreptileClient> {
        let api_key = SecretString::from(self.require(GREPTILE_API_KEY).await?);
        Ok(GreptileClient::new(api_key, &self.config.greptile.base_url)?)
    }

    /// Indexing coordinator reporting through `notifier`.
    pub async fn coordinator<N>(&self, notifier: N) -> anyhow::Result<ConcreteCoordinator<N>>
    where
        N: grepchat_core::notify::Notifier,
    {
        let greptile = self.greptile_client().await?;
        Ok(IndexingCoordinator::new(
            greptile,
            notifier,
            self.config.greptile.remote.clone(),
            self.config.greptile.branch.clone(),
        ))
    }
}
