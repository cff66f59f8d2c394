//! GitHub OAuth and REST wire types.
//!
//! GitHub-specific shapes only; they are converted into the
//! provider-agnostic types from `grepchat-types` at the client boundary.

use serde::{Deserialize, Serialize};

use grepchat_types::auth::{Credential, Identity, TokenGrant};
use grepchat_types::repository::{RepositoryId, RepositoryRef};

/// Body of `POST /login/oauth/access_token`.
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
    pub redirect_uri: &'a str,
}

/// Response of the token endpoint.
///
/// GitHub answers refusals with HTTP 200 and an `error` field, so both
/// shapes share one struct.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl AccessTokenResponse {
    pub fn into_grant(self) -> TokenGrant {
        match (self.access_token, self.error) {
            (Some(token), None) if !token.is_empty() => TokenGrant::Granted(Credential::new(token)),
            (_, error) => TokenGrant::Rejected {
                error: error.unwrap_or_else(|| "missing_access_token".to_string()),
                description: self.error_description,
            },
        }
    }
}

/// `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl From<GitHubUser> for Identity {
    fn from(user: GitHubUser) -> Self {
        Identity {
            login: user.login,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            html_url: user.html_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// One element of `GET /user/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub owner: GitHubOwner,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub private: bool,
}

impl From<GitHubRepo> for RepositoryRef {
    fn from(repo: GitHubRepo) -> Self {
        RepositoryRef {
            id: RepositoryId(repo.id),
            owner: repo.owner.login,
            name: repo.name,
            description: repo.description,
            default_branch: repo.default_branch,
            private: repo.private,
        }
    }
}
