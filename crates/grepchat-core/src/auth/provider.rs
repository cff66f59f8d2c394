//! Identity provider and authorization flow traits.
//!
//! Both use RPITIT (native async fn in traits, Rust 2024 edition).
//! Implementations live in grepchat-infra (e.g., `GitHubClient`,
//! `LoopbackAuthorizationFlow`).

use std::future::Future;

use grepchat_types::auth::{
    AuthorizationOutcome, AuthorizationRequest, Credential, Identity, TokenGrant,
};
use grepchat_types::error::AuthError;
use grepchat_types::repository::RepositoryRef;

/// An OAuth identity provider that also lists the user's repositories.
pub trait IdentityProvider: Send + Sync {
    /// Provider name, also used as the indexing `remote` (e.g. "github").
    fn name(&self) -> &str;

    fn client_id(&self) -> &str;

    fn redirect_uri(&self) -> &str;

    /// Full URL of the interactive consent screen for `request`.
    fn authorize_url(&self, request: &AuthorizationRequest) -> String;

    /// Exchange an authorization code for a bearer credential.
    ///
    /// A provider-side refusal is `Ok(TokenGrant::Rejected { .. })`;
    /// `Err` is reserved for transport and decoding failures.
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<TokenGrant, AuthError>> + Send;

    fn fetch_identity(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;

    /// First page of repositories accessible to the credential.
    fn fetch_repositories(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<Vec<RepositoryRef>, AuthError>> + Send;
}

/// The interactive half of the authorization-code flow.
///
/// Shows the consent screen at `authorize_url` and suspends until the
/// provider redirects back (or the user gives up).
pub trait AuthorizationFlow: Send + Sync {
    fn authorize(
        &self,
        authorize_url: &str,
        request: &AuthorizationRequest,
    ) -> impl Future<Output = Result<AuthorizationOutcome, AuthError>> + Send;
}
