//! grepchat CLI entry point.
//!
//! Binary name: `grepchat`
//!
//! Loads `.env`, parses arguments, sets up tracing, then dispatches to the
//! interactive session or a one-shot command.

mod cli;
mod state;

use clap::Parser;

use cli::{Cli, Commands, ConfigCommand, SecretCommand};
use grepchat_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = init_tracing(verbosity_filter(cli.verbose, cli.quiet), cli.otel) {
        eprintln!("Failed to initialize tracing: {e}");
    }
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let result = run(&cli).await;

    shutdown_tracing();
    result
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Some(Commands::Completions { shell }) = &cli.command {
        cli::write_completions(*shell, &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    dispatch(cli, &state).await
}

async fn dispatch(cli: &Cli, state: &AppState) -> anyhow::Result<()> {
    match &cli.command {
        None => cli::session::run_start(state, &[], cli.quiet).await,

        Some(Commands::Start { repos }) => cli::session::run_start(state, repos, cli.quiet).await,

        Some(Commands::Ask {
            question,
            repos,
            index,
        }) => cli::ask::run_ask(state, question, repos, *index, cli.json, cli.quiet).await,

        Some(Commands::Secret { action }) => match action {
            SecretCommand::Set { key, value } => {
                cli::secret::set_secret(state, key, value.as_deref(), cli.json).await
            }
            SecretCommand::Delete { key } => cli::secret::delete_secret(state, key, cli.json).await,
            SecretCommand::Status => cli::secret::secret_status(state, cli.json).await,
        },

        Some(Commands::Config { action }) => match action {
            ConfigCommand::Show => cli::config::show_config(state, cli.json),
            ConfigCommand::Path => cli::config::config_path_command(state, cli.json),
        },

        Some(Commands::Completions { .. }) => Ok(()),
    }
}
