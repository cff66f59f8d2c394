//! Chat loop: read a question, query the selection, render the answer.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use grepchat_core::notify::Notifier;
use grepchat_types::chat::Author;
use grepchat_types::error::CoordinatorError;

use crate::state::{ConcreteCoordinator, ConcreteEstablisher};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

pub const BOT_NAME: &str = "Greptile Bot";

/// How the chat ended.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatExit {
    /// `/exit` or Ctrl+D.
    Quit,
    /// `/signout`: the caller clears the session and offers sign-in again.
    SignedOut,
}

pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run the interactive chat until the user exits or signs out.
///
/// The coordinator must already be `Ready` (selection indexed).
pub async fn run_chat_loop<N: Notifier>(
    establisher: &ConcreteEstablisher,
    coordinator: &mut ConcreteCoordinator<N>,
) -> anyhow::Result<ChatExit> {
    let login = establisher
        .identity()
        .map(|i| i.display_name().to_string())
        .unwrap_or_else(|| "there".to_string());
    print_welcome_banner(&login, establisher.selection(), coordinator.branch());

    let renderer = ChatRenderer::new();
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let exit = loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break ChatExit::Quit,
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D or type /exit to leave.").dim());
                continue;
            }
            InputEvent::Message(text) => text,
        };
        if text.is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break ChatExit::Quit,
                ChatCommand::SignOut => break ChatExit::SignedOut,
                ChatCommand::Repos => {
                    println!();
                    for repo in establisher.selection() {
                        println!("  {} {}", style("-").dim(), style(repo.full_name()).cyan());
                    }
                    println!();
                }
                ChatCommand::History => print_history(coordinator),
                ChatCommand::Unknown(name) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(name).dim()
                    );
                }
            }
            continue;
        }

        let thinking = spinner("thinking...");
        let result = coordinator
            .query(&text, establisher.selection(), establisher.credential())
            .await;
        thinking.finish_and_clear();

        match result {
            Ok(entry) => renderer.print_answer(BOT_NAME, &entry.text, &entry.sources),
            // The coordinator has already raised an alert for this one.
            Err(CoordinatorError::Query(_)) => {
                println!("  {}", style("Type a question to retry, /exit to quit.").dim());
            }
            Err(e) => {
                println!("\n  {} {e}\n", style("!").yellow().bold());
            }
        }
    };

    chat_input.flush();
    println!("\n  {}", style("Session ended.").dim());
    Ok(exit)
}

fn print_history<N: Notifier>(coordinator: &ConcreteCoordinator<N>) {
    let log = coordinator.log();
    println!();
    if log.is_empty() {
        println!("  {}", style("No messages yet.").dim());
    }
    for entry in log.tail(20) {
        let label = match entry.author {
            Author::User => style("You").green().bold(),
            Author::Bot => style(BOT_NAME).cyan().bold(),
        };
        let preview: String = entry.text.chars().take(100).collect();
        let ellipsis = if entry.text.chars().count() > 100 { "..." } else { "" };
        println!(
            "  {} {} {}{}",
            style(entry.created_at.format("%H:%M")).dim(),
            label,
            preview.replace('\n', " "),
            ellipsis
        );
    }
    println!();
}
