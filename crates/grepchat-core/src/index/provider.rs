//! Code-index service trait (RPITIT, Rust 2024 edition).
//!
//! Implemented by `GreptileClient` in grepchat-infra.

use std::future::Future;

use grepchat_types::auth::Credential;
use grepchat_types::error::IndexError;
use grepchat_types::index::{IndexReceipt, IndexTarget, QueryAnswer, QueryRequest};

/// A remote service that indexes repositories and answers questions about them.
///
/// `credential` is the user's source-host token, forwarded so the service
/// can read private repositories. The service's own API key belongs to the
/// implementation.
pub trait CodeIndex: Send + Sync {
    fn name(&self) -> &str;

    /// Request (re-)indexing of one repository. Returns once the service
    /// has accepted the request, not when indexing has finished.
    fn index_repository(
        &self,
        target: &IndexTarget,
        credential: &Credential,
    ) -> impl Future<Output = Result<IndexReceipt, IndexError>> + Send;

    /// Ask a single non-streamed question across `request.targets`.
    fn query(
        &self,
        request: &QueryRequest,
        credential: &Credential,
    ) -> impl Future<Output = Result<QueryAnswer, IndexError>> + Send;
}
