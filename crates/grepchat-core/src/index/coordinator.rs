//! Indexing and query coordinator.
//!
//! Submits every selected repository for indexing, one request at a time,
//! then serves questions against the selection and keeps the conversation
//! log. State moves `Idle -> Indexing -> Ready -> (Querying <-> Ready)*`
//! and never enters an error state: failures are reported through the
//! notifier and the machine returns to `Ready`.

use std::fmt;

use tracing::{debug, info, warn};

use grepchat_types::alert::Alert;
use grepchat_types::auth::Credential;
use grepchat_types::chat::{ChatEntry, ConversationLog};
use grepchat_types::error::CoordinatorError;
use grepchat_types::index::{IndexTarget, IndexingReport, QueryRequest};
use grepchat_types::repository::Selection;

use super::provider::CodeIndex;
use crate::notify::Notifier;

const QUERY_FAILED_MESSAGE: &str = "An error occurred while querying the repository.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Indexing,
    Ready,
    Querying,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Indexing => write!(f, "indexing"),
            Self::Ready => write!(f, "ready"),
            Self::Querying => write!(f, "querying"),
        }
    }
}

pub struct IndexingCoordinator<I, N> {
    index: I,
    notifier: N,
    remote: String,
    branch: String,
    state: CoordinatorState,
    log: ConversationLog,
}

impl<I: CodeIndex, N: Notifier> IndexingCoordinator<I, N> {
    /// `remote` and `branch` are applied to every target this coordinator
    /// builds (e.g. `"github"`, `"main"`).
    pub fn new(
        index: I,
        notifier: N,
        remote: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            index,
            notifier,
            remote: remote.into(),
            branch: branch.into(),
            state: CoordinatorState::Idle,
            log: ConversationLog::new(),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Drop the conversation and return to `Idle`, e.g. after sign-out.
    pub fn reset(&mut self) {
        self.state = CoordinatorState::Idle;
        self.log = ConversationLog::new();
    }

    /// Treat the selection as already indexed by an earlier run.
    ///
    /// Only moves `Idle -> Ready`; any other state is left alone.
    pub fn assume_indexed(&mut self) {
        if self.state == CoordinatorState::Idle {
            debug!("Assuming selection was indexed previously");
            self.state = CoordinatorState::Ready;
        }
    }

    fn targets(&self, selection: &Selection) -> Vec<IndexTarget> {
        selection
            .iter()
            .map(|repo| IndexTarget::for_repository(repo, &self.remote, &self.branch))
            .collect()
    }

    /// Submit every selected repository for indexing, in selection order.
    ///
    /// Accepted from `Idle` or `Ready`. An empty selection raises a warning
    /// and a missing credential is refused; neither issues any request or
    /// changes state. A failed request raises one error alert for that
    /// repository and the loop moves on.
    pub async fn confirm_selection(
        &mut self,
        selection: &Selection,
        credential: Option<&Credential>,
    ) -> Result<IndexingReport, CoordinatorError> {
        if matches!(
            self.state,
            CoordinatorState::Indexing | CoordinatorState::Querying
        ) {
            return Err(CoordinatorError::InvalidState {
                action: "index",
                state: self.state.to_string(),
            });
        }

        if selection.is_empty() {
            self.notifier.notify(Alert::warning(
                "No Repositories Selected",
                "Please select at least one repository to index.",
            ));
            return Err(CoordinatorError::EmptySelection);
        }

        let Some(credential) = credential else {
            warn!("Refusing to index without a credential");
            return Err(CoordinatorError::NotAuthenticated);
        };

        self.notifier.notify(Alert::info(
            "Indexing Repositories",
            "Please wait while your selected repositories are being indexed.",
        ));
        self.state = CoordinatorState::Indexing;
        info!(count = selection.len(), index = self.index.name(), "Indexing selection");

        let mut report = IndexingReport::default();
        for repo in selection {
            let target = IndexTarget::for_repository(repo, &self.remote, &self.branch);
            report.attempted.push(repo.id);

            match self.index.index_repository(&target, credential).await {
                Ok(receipt) => {
                    debug!(
                        repository = %target.repository,
                        message = receipt.message.as_deref().unwrap_or(""),
                        "Repository submitted for indexing"
                    );
                }
                Err(e) => {
                    warn!(repository = %target.repository, error = %e, "Indexing request failed");
                    self.notifier
                        .notify(Alert::error("Error", "Failed to index repository."));
                    report.failed.push((repo.id, e.to_string()));
                }
            }
        }

        let message = if report.all_succeeded() {
            "Your selected repositories have been indexed successfully.".to_string()
        } else {
            format!(
                "Indexed {} of {} selected repositories.",
                report.succeeded(),
                report.attempted.len()
            )
        };
        self.notifier.notify(Alert::info("Repositories Indexed", message));
        self.state = CoordinatorState::Ready;

        info!(
            attempted = report.attempted.len(),
            failed = report.failed.len(),
            "Indexing finished"
        );
        Ok(report)
    }

    /// Ask one question across the selection.
    ///
    /// The user's entry is appended before the request is sent. On success
    /// the bot's entry follows it and is returned; on failure an alert is
    /// raised and only the user's entry remains. Refusals (wrong state, no
    /// credential, blank text, empty selection) append nothing.
    pub async fn query(
        &mut self,
        text: &str,
        selection: &Selection,
        credential: Option<&Credential>,
    ) -> Result<&ChatEntry, CoordinatorError> {
        if self.state != CoordinatorState::Ready {
            return Err(CoordinatorError::InvalidState {
                action: "query",
                state: self.state.to_string(),
            });
        }
        let Some(credential) = credential else {
            warn!("Refusing to query without a credential");
            return Err(CoordinatorError::NotAuthenticated);
        };
        let question = text.trim();
        if question.is_empty() {
            return Err(CoordinatorError::EmptyQuery);
        }
        if selection.is_empty() {
            return Err(CoordinatorError::EmptySelection);
        }

        self.log.append(ChatEntry::user(question));
        self.state = CoordinatorState::Querying;

        let request = QueryRequest {
            question: question.to_string(),
            targets: self.targets(selection),
        };
        debug!(targets = request.targets.len(), "Sending query");
        let result = self.index.query(&request, credential).await;
        self.state = CoordinatorState::Ready;

        match result {
            Ok(answer) => {
                debug!(sources = answer.sources.len(), "Answer received");
                self.log.append(ChatEntry::bot(answer.message, answer.sources));
                self.log.last().ok_or(CoordinatorError::EmptyQuery)
            }
            Err(e) => {
                warn!(error = %e, "Query failed");
                self.notifier.notify(Alert::error("Error", QUERY_FAILED_MESSAGE));
                Err(CoordinatorError::Query(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use grepchat_types::alert::AlertLevel;
    use grepchat_types::chat::Author;
    use grepchat_types::error::IndexError;
    use grepchat_types::index::{IndexReceipt, QueryAnswer, Source};
    use grepchat_types::repository::{RepositoryId, RepositoryRef};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    // --- Mock index ---

    #[derive(Default)]
    struct MockIndex {
        failing: HashSet<String>,
        fail_query: bool,
        indexed: Mutex<Vec<IndexTarget>>,
        queries: Mutex<Vec<QueryRequest>>,
    }

    impl MockIndex {
        fn failing_on(repository: &str) -> Self {
            Self {
                failing: HashSet::from([repository.to_string()]),
                ..Self::default()
            }
        }

        fn indexed(&self) -> Vec<String> {
            self.indexed
                .lock()
                .unwrap()
                .iter()
                .map(|t| t.repository.clone())
                .collect()
        }

        fn query_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    impl CodeIndex for MockIndex {
        fn name(&self) -> &str {
            "mock"
        }

        async fn index_repository(
            &self,
            target: &IndexTarget,
            _credential: &Credential,
        ) -> Result<IndexReceipt, IndexError> {
            self.indexed.lock().unwrap().push(target.clone());
            if self.failing.contains(&target.repository) {
                Err(IndexError::Status {
                    status: 500,
                    body: "internal error".to_string(),
                })
            } else {
                Ok(IndexReceipt {
                    message: Some("Indexing started".to_string()),
                    status_endpoint: None,
                })
            }
        }

        async fn query(
            &self,
            request: &QueryRequest,
            _credential: &Credential,
        ) -> Result<QueryAnswer, IndexError> {
            self.queries.lock().unwrap().push(request.clone());
            if self.fail_query {
                return Err(IndexError::Transport("connection reset".to_string()));
            }
            Ok(QueryAnswer {
                message: format!("answer to: {}", request.question),
                sources: vec![Source {
                    repository: request.targets[0].repository.clone(),
                    filepath: "src/lib.rs".to_string(),
                    line_start: Some(1),
                    line_end: Some(10),
                    summary: None,
                }],
            })
        }
    }

    fn repo(id: u64, owner: &str, name: &str) -> RepositoryRef {
        RepositoryRef {
            id: RepositoryId(id),
            owner: owner.to_string(),
            name: name.to_string(),
            description: None,
            default_branch: None,
            private: false,
        }
    }

    fn selection_of(repos: &[RepositoryRef]) -> Selection {
        let mut selection = Selection::new();
        for r in repos {
            selection.toggle(r);
        }
        selection
    }

    type TestCoordinator = IndexingCoordinator<MockIndex, Arc<RecordingNotifier>>;

    fn coordinator(index: MockIndex) -> (TestCoordinator, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let coord = IndexingCoordinator::new(index, Arc::clone(&notifier), "github", "main");
        (coord, notifier)
    }

    fn token() -> Credential {
        Credential::new("gho_test")
    }

    #[tokio::test]
    async fn test_one_request_per_repository_in_selection_order() {
        let (mut coord, notifier) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(2, "acme", "b"), repo(1, "acme", "a")]);

        let report = coord
            .confirm_selection(&selection, Some(&token()))
            .await
            .unwrap();

        assert_eq!(coord.index().indexed(), vec!["acme/b", "acme/a"]);
        assert_eq!(report.attempted, vec![RepositoryId(2), RepositoryId(1)]);
        assert!(report.all_succeeded());
        assert_eq!(coord.state(), CoordinatorState::Ready);

        let infos = notifier.alerts_at(AlertLevel::Info);
        assert_eq!(infos.first().unwrap().title, "Indexing Repositories");
        assert_eq!(infos.last().unwrap().title, "Repositories Indexed");
    }

    #[tokio::test]
    async fn test_targets_carry_remote_and_branch() {
        let (mut coord, _) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a")]);

        coord.confirm_selection(&selection, Some(&token())).await.unwrap();

        let indexed = coord.index().indexed.lock().unwrap().clone();
        assert_eq!(indexed[0].remote, "github");
        assert_eq!(indexed[0].branch, "main");
    }

    #[tokio::test]
    async fn test_empty_selection_warns_and_sends_nothing() {
        let (mut coord, notifier) = coordinator(MockIndex::default());

        let result = coord
            .confirm_selection(&Selection::new(), Some(&token()))
            .await;

        assert!(matches!(result, Err(CoordinatorError::EmptySelection)));
        assert!(coord.index().indexed().is_empty());
        assert_eq!(coord.state(), CoordinatorState::Idle);
        let warnings = notifier.alerts_at(AlertLevel::Warning);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].title, "No Repositories Selected");
    }

    #[tokio::test]
    async fn test_missing_credential_sends_nothing() {
        let (mut coord, notifier) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a")]);

        let result = coord.confirm_selection(&selection, None).await;

        assert!(matches!(result, Err(CoordinatorError::NotAuthenticated)));
        assert!(coord.index().indexed().is_empty());
        assert_eq!(coord.state(), CoordinatorState::Idle);
        assert!(notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_failure_on_first_repository_does_not_stop_the_second() {
        let (mut coord, notifier) = coordinator(MockIndex::failing_on("acme/a"));
        let selection = selection_of(&[repo(1, "acme", "a"), repo(2, "acme", "b")]);

        let report = coord
            .confirm_selection(&selection, Some(&token()))
            .await
            .unwrap();

        assert_eq!(coord.index().indexed(), vec!["acme/a", "acme/b"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, RepositoryId(1));
        assert_eq!(report.succeeded(), 1);

        let errors = notifier.alerts_at(AlertLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Failed to index repository.");
        assert_eq!(coord.state(), CoordinatorState::Ready);
    }

    #[tokio::test]
    async fn test_reindex_from_ready_is_allowed() {
        let (mut coord, _) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a")]);

        coord.confirm_selection(&selection, Some(&token())).await.unwrap();
        coord.confirm_selection(&selection, Some(&token())).await.unwrap();

        assert_eq!(coord.index().indexed().len(), 2);
    }

    #[tokio::test]
    async fn test_query_before_indexing_is_refused() {
        let (mut coord, _) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a")]);

        let result = coord.query("hello", &selection, Some(&token())).await;

        assert!(matches!(
            result,
            Err(CoordinatorError::InvalidState { action: "query", .. })
        ));
        assert!(coord.log().is_empty());
        assert_eq!(coord.index().query_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_query_appends_user_then_bot() {
        let (mut coord, _) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a")]);
        coord.confirm_selection(&selection, Some(&token())).await.unwrap();

        let entry = coord
            .query("what is this?", &selection, Some(&token()))
            .await
            .unwrap();
        assert_eq!(entry.author, Author::Bot);
        assert_eq!(entry.text, "answer to: what is this?");
        assert_eq!(entry.sources.len(), 1);

        let entries = coord.log().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].author, Author::User);
        assert_eq!(entries[0].text, "what is this?");
        assert_eq!(entries[1].author, Author::Bot);
        assert_eq!(coord.state(), CoordinatorState::Ready);
    }

    #[tokio::test]
    async fn test_failed_query_keeps_only_user_entry() {
        let index = MockIndex {
            fail_query: true,
            ..MockIndex::default()
        };
        let (mut coord, notifier) = coordinator(index);
        let selection = selection_of(&[repo(1, "acme", "a")]);
        coord.confirm_selection(&selection, Some(&token())).await.unwrap();

        let result = coord.query("why?", &selection, Some(&token())).await;

        assert!(matches!(result, Err(CoordinatorError::Query(_))));
        assert_eq!(coord.log().len(), 1);
        assert_eq!(coord.log().entries()[0].author, Author::User);
        assert_eq!(coord.state(), CoordinatorState::Ready);
        let errors = notifier.alerts_at(AlertLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, QUERY_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_query_targets_whole_selection() {
        let (mut coord, _) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a"), repo(2, "acme", "b")]);
        coord.confirm_selection(&selection, Some(&token())).await.unwrap();

        coord.query("q", &selection, Some(&token())).await.unwrap();

        let queries = coord.index().queries.lock().unwrap().clone();
        let repos: Vec<_> = queries[0].targets.iter().map(|t| t.repository.as_str()).collect();
        assert_eq!(repos, vec!["acme/a", "acme/b"]);
    }

    #[tokio::test]
    async fn test_blank_query_and_missing_credential_append_nothing() {
        let (mut coord, _) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a")]);
        coord.confirm_selection(&selection, Some(&token())).await.unwrap();

        assert!(matches!(
            coord.query("   ", &selection, Some(&token())).await,
            Err(CoordinatorError::EmptyQuery)
        ));
        assert!(matches!(
            coord.query("hi", &selection, None).await,
            Err(CoordinatorError::NotAuthenticated)
        ));
        assert!(coord.log().is_empty());
        assert_eq!(coord.index().query_count(), 0);
    }

    #[tokio::test]
    async fn test_assume_indexed_allows_query_without_indexing() {
        let (mut coord, _) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a")]);

        coord.assume_indexed();
        coord.query("q", &selection, Some(&token())).await.unwrap();

        assert!(coord.index().indexed().is_empty());
        assert_eq!(coord.log().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let (mut coord, _) = coordinator(MockIndex::default());
        let selection = selection_of(&[repo(1, "acme", "a")]);
        coord.confirm_selection(&selection, Some(&token())).await.unwrap();
        coord.query("q", &selection, Some(&token())).await.unwrap();

        coord.reset();

        assert_eq!(coord.state(), CoordinatorState::Idle);
        assert!(coord.log().is_empty());
    }
}
