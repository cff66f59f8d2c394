//! One-shot question against repositories named on the command line.
//!
//! Skips the OAuth flow: the GitHub token comes from `GREPCHAT_GITHUB_TOKEN`
//! or `GITHUB_TOKEN`.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use grepchat_core::notify::{Notifier, RecordingNotifier};
use grepchat_core::secret::provider::SecretProvider;
use grepchat_infra::secret::env::EnvSecretProvider;
use grepchat_types::alert::Alert;
use grepchat_types::auth::Credential;
use grepchat_types::index::Source;
use grepchat_types::repository::{RepositoryId, RepositoryRef, Selection};

use crate::cli::alerts::ConsoleNotifier;
use crate::cli::chat::loop_runner::{BOT_NAME, spinner};
use crate::cli::chat::renderer::ChatRenderer;
use crate::state::AppState;

const TOKEN_KEY: &str = "GITHUB_TOKEN";

#[derive(Serialize)]
struct AskOutput<'a> {
    answer: Option<&'a str>,
    sources: &'a [Source],
    alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> AskOutput<'a> {
    /// Alerts are kept on failure so callers see why the question failed.
    fn new(result: &'a Result<(String, Vec<Source>)>, alerts: Vec<Alert>) -> Self {
        match result {
            Ok((text, sources)) => Self {
                answer: Some(text),
                sources,
                alerts,
                error: None,
            },
            Err(e) => Self {
                answer: None,
                sources: &[],
                alerts,
                error: Some(format!("{e:#}")),
            },
        }
    }
}

pub async fn run_ask(
    state: &AppState,
    question: &str,
    repos: &[String],
    index_first: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let token = EnvSecretProvider::new()
        .get(TOKEN_KEY)
        .await?
        .context("GITHUB_TOKEN is not set. Export a GitHub token with repo scope to use `ask`.")?;
    let credential = Credential::new(token);
    let selection = selection_from_specs(repos)?;

    if json {
        let notifier = Arc::new(RecordingNotifier::new());
        let answer = ask_with(
            state,
            Arc::clone(&notifier),
            question,
            &selection,
            &credential,
            index_first,
            false,
        )
        .await;
        let output = AskOutput::new(&answer, notifier.drain());
        println!("{}", serde_json::to_string_pretty(&output)?);
        return answer.map(|_| ());
    }

    let notifier = Arc::new(ConsoleNotifier::new(quiet));
    let (text, sources) =
        ask_with(state, notifier, question, &selection, &credential, index_first, !quiet).await?;
    ChatRenderer::new().print_answer(BOT_NAME, &text, &sources);
    Ok(())
}

async fn ask_with<N: Notifier>(
    state: &AppState,
    notifier: N,
    question: &str,
    selection: &Selection,
    credential: &Credential,
    index_first: bool,
    show_progress: bool,
) -> Result<(String, Vec<Source>)> {
    let mut coordinator = state.coordinator(notifier).await?;

    if index_first {
        let progress = show_progress.then(|| spinner("Indexing repositories..."));
        let report = coordinator
            .confirm_selection(selection, Some(credential))
            .await;
        if let Some(p) = progress {
            p.finish_and_clear();
        }
        let report = report?;
        if report.succeeded() == 0 {
            bail!("none of the repositories could be submitted for indexing");
        }
    } else {
        coordinator.assume_indexed();
    }

    let progress = show_progress.then(|| spinner("thinking..."));
    let result = coordinator.query(question, selection, Some(credential)).await;
    if let Some(p) = progress {
        p.finish_and_clear();
    }
    let entry = result?;
    Ok((entry.text.clone(), entry.sources.clone()))
}

/// Build a selection from `owner/name` specs, ignoring case-insensitive
/// duplicates. Ids are positional; nothing here talks to GitHub.
fn selection_from_specs(specs: &[String]) -> Result<Selection> {
    let mut selection = Selection::new();
    let mut seen: Vec<RepositoryRef> = Vec::new();

    for spec in specs {
        let Some((owner, name)) = spec.trim().split_once('/') else {
            bail!("invalid repository {spec:?}: expected OWNER/NAME");
        };
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            bail!("invalid repository {spec:?}: expected OWNER/NAME");
        }
        if seen.iter().any(|r| r.matches_full_name(spec.trim())) {
            tracing::debug!(repository = %spec, "Duplicate repository ignored");
            continue;
        }
        let repo = RepositoryRef {
            id: RepositoryId(seen.len() as u64 + 1),
            owner: owner.to_string(),
            name: name.to_string(),
            description: None,
            default_branch: None,
            private: false,
        };
        selection.toggle(&repo);
        seen.push(repo);
    }

    if selection.is_empty() {
        bail!("at least one --repo OWNER/NAME is required");
    }
    Ok(selection)
}
