//! GitHubClient -- concrete [`IdentityProvider`] for GitHub OAuth apps.
//!
//! Builds the consent-screen URL, exchanges authorization codes at
//! `/login/oauth/access_token`, and reads `/user` and `/user/repos` from
//! the REST API. Every call is a single request with no retry.
//!
//! The client secret is wrapped in [`secrecy::SecretString`] and is only
//! exposed while building the token-exchange body.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use grepchat_core::auth::provider::IdentityProvider;
use grepchat_types::auth::{AuthorizationRequest, Credential, Identity, TokenGrant};
use grepchat_types::config::GitHubConfig;
use grepchat_types::error::AuthError;
use grepchat_types::repository::RepositoryRef;

use super::types::{AccessTokenRequest, AccessTokenResponse, GitHubRepo, GitHubUser};

const API_ACCEPT: &str = "application/vnd.github+json";

/// GitHub OAuth + REST client.
///
/// Not `Debug`: it holds the OAuth client secret.
pub struct GitHubClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    oauth_base_url: String,
    api_base_url: String,
    per_page: u8,
    user_agent: String,
}

impl GitHubClient {
    /// Create a client for the OAuth app identified by `client_id`.
    pub fn new(
        config: &GitHubConfig,
        client_id: impl Into<String>,
        client_secret: SecretString,
    ) -> Result<Self, AuthError> {
        // No request timeout: a call runs until GitHub answers or the
        // connection fails.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AuthError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            client_id: client_id.into(),
            client_secret,
            redirect_uri: config.redirect_uri(),
            oauth_base_url: trim_base(&config.oauth_base_url),
            api_base_url: trim_base(&config.api_base_url),
            per_page: config.repos_per_page,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Point both the OAuth and REST endpoints at `base_url` (tests, proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.oauth_base_url = trim_base(base_url);
        self.api_base_url = trim_base(base_url);
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Map a non-success response into `AuthError::Status`.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn authorized_get(&self, url: &str, credential: &Credential) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("token {}", credential.expose()))
            .header("Accept", API_ACCEPT)
            .header("User-Agent", &self.user_agent)
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

impl IdentityProvider for GitHubClient {
    fn name(&self) -> &str {
        "github"
    }

    fn client_id(&self) -> &str {
        &self.client_id
    }

    fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    fn authorize_url(&self, request: &AuthorizationRequest) -> String {
        let base = format!("{}/login/oauth/authorize", self.oauth_base_url);
        match Url::parse_with_params(
            &base,
            &[
                ("client_id", request.client_id.as_str()),
                ("redirect_uri", request.redirect_uri.as_str()),
                ("scope", request.scope_param().as_str()),
                ("state", request.state.as_str()),
            ],
        ) {
            Ok(url) => url.to_string(),
            Err(e) => {
                // Only reachable with a malformed oauth_base_url in config.
                tracing::warn!(error = %e, base = %base, "Invalid OAuth base URL");
                base
            }
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, AuthError> {
        let url = format!("{}/login/oauth/access_token", self.oauth_base_url);
        let body = AccessTokenRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            code,
            redirect_uri: &self.redirect_uri,
        };

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("token exchange failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(format!("failed to read token response: {e}")))?;

        // GitHub reports refusals in the body; honour them whatever the status.
        let parsed = serde_json::from_str::<AccessTokenResponse>(&body);
        if !status.is_success() {
            return match parsed {
                Ok(token) if token.error.is_some() => Ok(token.into_grant()),
                _ => Err(AuthError::Status {
                    status: status.as_u16(),
                    body,
                }),
            };
        }

        let token = parsed.map_err(|e| {
            AuthError::Deserialization(format!("failed to parse token response: {e}"))
        })?;
        Ok(token.into_grant())
    }

    async fn fetch_identity(&self, credential: &Credential) -> Result<Identity, AuthError> {
        let url = self.api_url("/user");
        let response = self
            .authorized_get(&url, credential)
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("identity request failed: {e}")))?;
        let response = Self::check_status(response).await?;

        let user: GitHubUser = response
            .json()
            .await
            .map_err(|e| AuthError::Deserialization(format!("failed to parse user: {e}")))?;
        Ok(user.into())
    }

    async fn fetch_repositories(
        &self,
        credential: &Credential,
    ) -> Result<Vec<RepositoryRef>, AuthError> {
        let url = self.api_url("/user/repos");
        let response = self
            .authorized_get(&url, credential)
            .query(&[("per_page", self.per_page.to_string())])
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("repository request failed: {e}")))?;
        let response = Self::check_status(response).await?;

        let repos: Vec<GitHubRepo> = response.json().await.map_err(|e| {
            AuthError::Deserialization(format!("failed to parse repositories: {e}"))
        })?;
        Ok(repos.into_iter().map(RepositoryRef::from).collect())
    }
}
