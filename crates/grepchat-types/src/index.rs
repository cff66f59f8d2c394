//! Provider-agnostic indexing and query types.
//!
//! The wire formats of a concrete indexing service live in grepchat-infra;
//! these are the shapes the coordinator works with.

use serde::{Deserialize, Serialize};

use crate::repository::{RepositoryId, RepositoryRef};

/// One repository as addressed by the indexing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTarget {
    /// Hosting provider name (e.g. "github").
    pub remote: String,
    /// `"owner/name"`.
    pub repository: String,
    pub branch: String,
}

impl IndexTarget {
    pub fn for_repository(repo: &RepositoryRef, remote: &str, branch: &str) -> Self {
        Self {
            remote: remote.to_string(),
            repository: repo.full_name(),
            branch: branch.to_string(),
        }
    }
}

/// Acknowledgement returned when a repository is submitted for indexing.
///
/// The body is logged, not validated; both fields are best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReceipt {
    pub message: Option<String>,
    pub status_endpoint: Option<String>,
}

/// A natural-language question against a set of indexed repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub targets: Vec<IndexTarget>,
}

/// A code reference cited by an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub repository: String,
    pub filepath: String,
    #[serde(default)]
    pub line_start: Option<u32>,
    #[serde(default)]
    pub line_end: Option<u32>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Source {
    /// `repo:path:start-end` style label for display.
    pub fn label(&self) -> String {
        match (self.line_start, self.line_end) {
            (Some(start), Some(end)) if end != start => {
                format!("{}:{}:{start}-{end}", self.repository, self.filepath)
            }
            (Some(start), _) => format!("{}:{}:{start}", self.repository, self.filepath),
            _ => format!("{}:{}", self.repository, self.filepath),
        }
    }
}

/// The provider's textual answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub message: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Outcome of one `confirm_selection` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexingReport {
    /// Every repository an indexing request was issued for, in order.
    pub attempted: Vec<RepositoryId>,
    /// Repositories whose request failed, with the failure message.
    pub failed: Vec<(RepositoryId, String)>,
}

impl IndexingReport {
    pub fn succeeded(&self) -> usize {
        self.attempted.len() - self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}
