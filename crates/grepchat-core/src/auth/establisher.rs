//! Session establisher.
//!
//! Owns the in-memory session: credential, identity, the repository list
//! fetched for that identity, and the user's selection out of that list.
//! Every network step is a single request with no retry; failures either
//! raise an alert (token exchange refusal) or are logged and leave the
//! session without identity/repositories.

use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info, warn};

use grepchat_types::alert::Alert;
use grepchat_types::auth::{
    AuthorizationOutcome, AuthorizationRequest, Credential, Identity, OAUTH_SCOPES, TokenGrant,
};
use grepchat_types::error::{AuthError, SessionError};
use grepchat_types::repository::{RepositoryId, RepositoryRef, Selection};

use super::provider::{AuthorizationFlow, IdentityProvider};
use crate::notify::Notifier;

/// Length of the random anti-forgery `state` parameter.
const STATE_LEN: usize = 32;

const EXCHANGE_FALLBACK_MESSAGE: &str = "An error occurred while fetching access token.";

/// Everything known about the signed-in user. Cleared as a whole on sign-out.
#[derive(Debug, Default)]
pub struct SessionState {
    credential: Option<Credential>,
    identity: Option<Identity>,
    repositories: Vec<RepositoryRef>,
    selection: Selection,
}

/// How an interactive sign-in attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// A credential was obtained. Identity and repositories may still be
    /// missing if those lookups failed.
    SignedIn,
    /// The consent screen was denied or abandoned.
    Cancelled,
}

/// Drives OAuth sign-in and repository discovery for a single account.
pub struct SessionEstablisher<P, N> {
    provider: P,
    notifier: N,
    state: SessionState,
}

impl<P: IdentityProvider, N: Notifier> SessionEstablisher<P, N> {
    pub fn new(provider: P, notifier: N) -> Self {
        Self {
            provider,
            notifier,
            state: SessionState::default(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.state.credential.as_ref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.identity.as_ref()
    }

    pub fn repositories(&self) -> &[RepositoryRef] {
        &self.state.repositories
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.credential.is_some()
    }

    /// Look up a fetched repository by `owner/name`.
    pub fn find_repository(&self, full_name: &str) -> Option<&RepositoryRef> {
        self.state
            .repositories
            .iter()
            .find(|r| r.matches_full_name(full_name))
    }

    /// Build a fresh authorization request with the fixed scope set.
    pub fn authorization_request(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            client_id: self.provider.client_id().to_string(),
            redirect_uri: self.provider.redirect_uri().to_string(),
            scopes: OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
            state: random_state(),
        }
    }

    /// Run the interactive consent screen and wait for the redirect.
    ///
    /// Returns the authorization code, or `None` when the user denied or
    /// abandoned the flow (no alert is raised in that case).
    pub async fn begin_authorization<F: AuthorizationFlow>(
        &mut self,
        flow: &F,
    ) -> Result<Option<String>, SessionError> {
        let request = self.authorization_request();
        let url = self.provider.authorize_url(&request);
        info!(provider = self.provider.name(), "Starting OAuth authorization");

        match flow.authorize(&url, &request).await? {
            AuthorizationOutcome::Code(code) => {
                debug!("Authorization code received");
                Ok(Some(code))
            }
            AuthorizationOutcome::Denied { reason } => {
                info!(%reason, "Authorization denied");
                Ok(None)
            }
            AuthorizationOutcome::Cancelled => {
                info!("Authorization cancelled");
                Ok(None)
            }
        }
    }

    /// Exchange `code` for a credential, then discover identity and repositories.
    ///
    /// A provider refusal raises an alert with the provider's description and
    /// leaves the session unauthenticated. Transport failures are only logged.
    /// Identity/repository lookup failures after a successful exchange do not
    /// fail this call.
    pub async fn exchange_code(&mut self, code: &str) -> Result<(), SessionError> {
        debug!("Exchanging authorization code");
        let grant = match self.provider.exchange_code(code).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(error = %e, "Token exchange failed");
                return Err(e.into());
            }
        };

        match grant {
            TokenGrant::Granted(credential) => {
                info!(credential = %credential.masked(), "Access token obtained");
                self.state.credential = Some(credential);
                if let Err(e) = self.fetch_identity().await {
                    warn!(error = %e, "Signed in without identity");
                }
                Ok(())
            }
            TokenGrant::Rejected { error, description } => {
                warn!(%error, "Token exchange rejected by provider");
                let message = description
                    .clone()
                    .unwrap_or_else(|| EXCHANGE_FALLBACK_MESSAGE.to_string());
                self.notifier.notify(Alert::error("Error", message));
                Err(AuthError::Rejected { error, description }.into())
            }
        }
    }

    /// Fetch the authenticated identity, then the repository list.
    ///
    /// On failure the session keeps no identity and no repositories.
    pub async fn fetch_identity(&mut self) -> Result<&Identity, SessionError> {
        let credential = self
            .state
            .credential
            .clone()
            .ok_or(SessionError::NotAuthenticated)?;

        match self.provider.fetch_identity(&credential).await {
            Ok(identity) => {
                info!(login = %identity.login, "Identity fetched");
                self.state.identity = Some(identity);
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch identity");
                return Err(e.into());
            }
        }

        if let Err(e) = self.fetch_repositories().await {
            debug!(error = %e, "Continuing with an empty repository list");
        }

        self.state
            .identity
            .as_ref()
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Replace the repository list with the provider's first page.
    ///
    /// On failure the list is left empty. The selection is pruned to the new
    /// list either way.
    pub async fn fetch_repositories(&mut self) -> Result<usize, SessionError> {
        let credential = self
            .state
            .credential
            .clone()
            .ok_or(SessionError::NotAuthenticated)?;

        let result = self.provider.fetch_repositories(&credential).await;
        let outcome = match result {
            Ok(repos) => {
                info!(count = repos.len(), "Repositories fetched");
                self.state.repositories = repos;
                Ok(self.state.repositories.len())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch repositories");
                self.state.repositories.clear();
                Err(e.into())
            }
        };
        self.state.selection.retain_known(&self.state.repositories);
        outcome
    }

    /// Toggle a fetched repository in or out of the selection.
    ///
    /// Returns whether it is selected afterwards. Repositories that are not
    /// in the fetched list are refused.
    pub fn toggle_selection(&mut self, id: RepositoryId) -> Result<bool, SessionError> {
        let repo = self
            .state
            .repositories
            .iter()
            .find(|r| r.id == id)
            .ok_or(SessionError::UnknownRepository(id.0))?;
        let selected = self.state.selection.toggle(repo);
        debug!(repository = %repo.full_name(), selected, "Selection toggled");
        Ok(selected)
    }

    /// Interactive authorization followed by the code exchange.
    pub async fn sign_in<F: AuthorizationFlow>(
        &mut self,
        flow: &F,
    ) -> Result<SignInOutcome, SessionError> {
        let Some(code) = self.begin_authorization(flow).await? else {
            return Ok(SignInOutcome::Cancelled);
        };
        self.exchange_code(&code).await?;
        Ok(SignInOutcome::SignedIn)
    }

    /// Forget the credential, identity, repositories and selection.
    ///
    /// Synchronous and idempotent; no network call is made.
    pub fn sign_out(&mut self) {
        let was_signed_in = self.state.credential.is_some()
            || self.state.identity.is_some()
            || !self.state.repositories.is_empty()
            || !self.state.selection.is_empty();

        self.state = SessionState::default();

        if was_signed_in {
            info!("Signed out");
            self.notifier.notify(Alert::info(
                "Signed out",
                "You have been signed out successfully.",
            ));
        }
    }
}

fn random_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect()
}
