//! Authentication types: the in-memory GitHub credential, the authenticated
//! identity, and the shapes exchanged during the OAuth authorization-code flow.

use serde::{Deserialize, Serialize};

use std::fmt;

/// OAuth scopes requested during authorization.
pub const OAUTH_SCOPES: [&str; 5] = ["user", "read:org", "user:email", "repo", "gist"];

/// A GitHub bearer token obtained from the code exchange.
///
/// Held only in process memory. Debug and Display output is redacted;
/// the raw value is accessible via `.expose()` when building request headers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw token.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Show masked representation: last 4 chars visible.
    pub fn masked(&self) -> String {
        let count = self.0.chars().count();
        if count <= 4 {
            "****".to_string()
        } else {
            let tail: String = self.0.chars().skip(count - 4).collect();
            format!("****{tail}")
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(\"***\")")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// The authenticated GitHub user. Read-only, used for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
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

impl Identity {
    /// Name to greet the user with: the profile name when set, else the login.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.login)
    }
}

/// Parameters of one interactive authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Anti-forgery value echoed back by the provider on redirect.
    pub state: String,
}

impl AuthorizationRequest {
    /// Space-separated scope string as expected by the authorize endpoint.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}

/// What came back from the consent screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    /// The provider redirected back with an authorization code.
    Code(String),
    /// The provider (or the user) refused, or the redirect was not ours.
    Denied { reason: String },
    /// The user abandoned the flow before a redirect arrived.
    Cancelled,
}

/// Result of a token exchange as reported by the provider.
///
/// GitHub answers HTTP 200 even for failed exchanges, so the error
/// case is part of the payload rather than the status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    Granted(Credential),
    Rejected {
        error: String,
        description: Option<String>,
    },
}
