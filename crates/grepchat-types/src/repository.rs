//! Repository references and the user's repository selection.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Provider-assigned numeric repository identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(pub u64);

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A remote repository as listed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub id: RepositoryId,
    /// Owner login (user or organization).
    pub owner: String,
    pub name: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    pub private: bool,
}

impl RepositoryRef {
    /// `"owner/name"`, the identifier shape the indexing service expects.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Whether `spec` (`owner/name`, case-insensitive) names this repository.
    pub fn matches_full_name(&self, spec: &str) -> bool {
        self.full_name().eq_ignore_ascii_case(spec.trim())
    }
}

/// Repositories chosen by the user, unique by id, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    repos: Vec<RepositoryRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `repo` if absent, remove it if present.
    ///
    /// Returns `true` when the repository is selected after the call.
    pub fn toggle(&mut self, repo: &RepositoryRef) -> bool {
        if let Some(pos) = self.repos.iter().position(|r| r.id == repo.id) {
            self.repos.remove(pos);
            false
        } else {
            self.repos.push(repo.clone());
            true
        }
    }

    pub fn contains(&self, id: RepositoryId) -> bool {
        self.repos.iter().any(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepositoryRef> {
        self.repos.iter()
    }

    /// Drop selected repositories that are not in `known`.
    pub fn retain_known(&mut self, known: &[RepositoryRef]) {
        self.repos.retain(|r| known.iter().any(|k| k.id == r.id));
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a RepositoryRef;
    type IntoIter = std::slice::Iter<'a, RepositoryRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.repos.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: u64, name: &str) -> RepositoryRef {
        RepositoryRef {
            id: RepositoryId(id),
            owner: "octocat".to_string(),
            name: name.to_string(),
            description: None,
            default_branch: Some("main".to_string()),
            private: false,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(repo(1, "hello-world").full_name(), "octocat/hello-world");
        assert!(repo(1, "hello-world").matches_full_name(" Octocat/Hello-World "));
        assert!(!repo(1, "hello-world").matches_full_name("octocat/other"));
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = Selection::new();
        let a = repo(1, "a");

        assert!(selection.toggle(&a));
        assert!(selection.contains(a.id));
        assert!(!selection.toggle(&a));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_unique_by_id_and_ordered() {
        let mut selection = Selection::new();
        let a = repo(1, "a");
        let b = repo(2, "b");
        let c = repo(3, "c");

        selection.toggle(&b);
        selection.toggle(&a);
        selection.toggle(&c);
        selection.toggle(&a);
        selection.toggle(&a);

        let names: Vec<_> = selection.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_retain_known_prunes_missing() {
        let mut selection = Selection::new();
        let a = repo(1, "a");
        let b = repo(2, "b");
        selection.toggle(&a);
        selection.toggle(&b);

        selection.retain_known(&[b.clone()]);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(b.id));
    }
}
