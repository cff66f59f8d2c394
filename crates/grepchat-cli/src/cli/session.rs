//! The interactive `start` flow: sign in, pick repositories, index, chat.

use std::sync::Arc;

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, MultiSelect};

use grepchat_core::auth::establisher::{SessionEstablisher, SignInOutcome};
use grepchat_infra::github::LoopbackAuthorizationFlow;
use grepchat_types::error::CoordinatorError;
use grepchat_types::repository::RepositoryRef;

use crate::cli::alerts::ConsoleNotifier;
use crate::cli::chat::loop_runner::{ChatExit, run_chat_loop, spinner};
use crate::state::{AppState, ConcreteCoordinator, ConcreteEstablisher};

/// Run sign-in, selection and chat until the user quits.
///
/// `/signout` in the chat clears the session and loops back to sign-in.
pub async fn run_start(state: &AppState, preselect: &[String], quiet: bool) -> Result<()> {
    let notifier = Arc::new(ConsoleNotifier::new(quiet));
    let github = state.github_client().await?;
    let mut establisher: ConcreteEstablisher = SessionEstablisher::new(github, Arc::clone(&notifier));
    let mut coordinator: ConcreteCoordinator = state.coordinator(Arc::clone(&notifier)).await?;

    let flow = LoopbackAuthorizationFlow::new(
        &state.config.github,
        Box::new(|url: &str| {
            println!();
            println!("  {}", style("Open this URL in your browser to sign in with GitHub:").bold());
            println!();
            println!("  {}", style(url).cyan().underlined());
            println!();
            println!("  {}", style("Waiting for GitHub to redirect back...").dim());
        }),
    );

    loop {
        if !sign_in(&mut establisher, &flow).await? {
            return Ok(());
        }

        if establisher.repositories().is_empty() {
            println!(
                "\n  {} No repositories were found for this account.\n",
                style("!").yellow().bold()
            );
            establisher.sign_out();
            if retry("Sign in again?")? {
                continue;
            }
            return Ok(());
        }

        if !select_and_index(&mut establisher, &mut coordinator, preselect).await? {
            return Ok(());
        }

        match run_chat_loop(&establisher, &mut coordinator).await? {
            ChatExit::Quit => return Ok(()),
            ChatExit::SignedOut => {
                establisher.sign_out();
                coordinator.reset();
            }
        }
    }
}

fn retry(prompt: &str) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()?)
}

/// Loop until signed in or the user gives up. Returns whether signed in.
async fn sign_in(
    establisher: &mut ConcreteEstablisher,
    flow: &LoopbackAuthorizationFlow,
) -> Result<bool> {
    loop {
        match establisher.sign_in(flow).await {
            Ok(SignInOutcome::SignedIn) => {
                let name = establisher
                    .identity()
                    .map(|i| i.display_name().to_string())
                    .unwrap_or_else(|| "there".to_string());
                println!("\n  {} Welcome, {}!", style("*").green().bold(), style(name).cyan().bold());
                return Ok(true);
            }
            Ok(SignInOutcome::Cancelled) => {
                println!("\n  {}", style("Sign-in was not completed.").dim());
            }
            Err(e) => {
                tracing::debug!(error = %e, "Sign-in failed");
                println!("\n  {} Sign-in failed: {e}", style("x").red().bold());
            }
        }
        if !retry("Try signing in again?")? {
            return Ok(false);
        }
    }
}

/// Multi-select repositories and index them. Returns false if the user
/// abandoned selection.
async fn select_and_index(
    establisher: &mut ConcreteEstablisher,
    coordinator: &mut ConcreteCoordinator,
    preselect: &[String],
) -> Result<bool> {
    loop {
        let chosen = prompt_selection(establisher, preselect)?;
        apply_selection(establisher, &chosen)?;

        let indexing = spinner("Indexing repositories...");
        let result = coordinator
            .confirm_selection(establisher.selection(), establisher.credential())
            .await;
        indexing.finish_and_clear();

        match result {
            Ok(report) => {
                tracing::info!(
                    succeeded = report.succeeded(),
                    failed = report.failed.len(),
                    "Selection indexed"
                );
                return Ok(true);
            }
            // Warning alert already shown.
            Err(CoordinatorError::EmptySelection) => {
                if !retry("Select repositories again?")? {
                    return Ok(false);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn prompt_selection(establisher: &ConcreteEstablisher, preselect: &[String]) -> Result<Vec<usize>> {
    let mut preselected = Vec::new();
    for spec in preselect {
        match establisher.find_repository(spec) {
            Some(repo) => preselected.push(repo.id),
            None => println!(
                "  {} {} is not among your repositories; ignoring",
                style("!").yellow().bold(),
                style(spec).bold()
            ),
        }
    }

    let repos = establisher.repositories();
    let labels: Vec<String> = repos.iter().map(repository_label).collect();
    let defaults: Vec<bool> = repos.iter().map(|r| preselected.contains(&r.id)).collect();

    Ok(MultiSelect::new()
        .with_prompt("Select repositories to index (space to toggle, enter to confirm)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?)
}

/// Toggle the establisher's selection so it matches the chosen indices.
fn apply_selection(establisher: &mut ConcreteEstablisher, chosen: &[usize]) -> Result<()> {
    let changes: Vec<_> = establisher
        .repositories()
        .iter()
        .enumerate()
        .filter(|(i, r)| chosen.contains(i) != establisher.selection().contains(r.id))
        .map(|(_, r)| r.id)
        .collect();
    for id in changes {
        establisher.toggle_selection(id)?;
    }
    Ok(())
}

fn repository_label(repo: &RepositoryRef) -> String {
    let mut label = repo.full_name();
    if repo.private {
        label.push_str(" (private)");
    }
    if let Some(desc) = repo.description.as_deref().filter(|d| !d.is_empty()) {
        let short: String = desc.chars().take(60).collect();
        label.push_str(&format!(" - {short}"));
    }
    label
}
