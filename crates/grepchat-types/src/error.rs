use thiserror::Error;

/// Errors from the identity provider (OAuth exchange, identity, repository list).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("token exchange rejected: {error}")]
    Rejected {
        error: String,
        description: Option<String>,
    },

    #[error("authorization listener error: {0}")]
    Listener(String),
}

/// Errors from the code-indexing service.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Errors surfaced by the session establisher.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("repository {0} is not in the fetched repository list")]
    UnknownRepository(u64),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Errors surfaced by the indexing and query coordinator.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("no repositories selected")]
    EmptySelection,

    #[error("question is empty")]
    EmptyQuery,

    #[error("cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },

    #[error("query failed: {0}")]
    Query(#[source] IndexError),
}

/// Errors related to secret resolution.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret '{0}' not found")]
    NotFound(String),

    #[error("secret provider is read-only")]
    ReadOnly,

    #[error("secret backend error: {0}")]
    Backend(String),
}
