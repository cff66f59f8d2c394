//! CLI command definitions for the `grepchat` binary.
//!
//! Uses clap derive macros. Running `grepchat` with no command starts the
//! interactive sign-in, repository selection and chat flow.

pub mod alerts;
pub mod ask;
pub mod chat;
pub mod config;
pub mod secret;
pub mod session;

use std::io::Write;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

/// Chat with your GitHub repositories through Greptile.
#[derive(Parser)]
#[command(name = "grepchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with GitHub, pick repositories, index them and start chatting.
    Start {
        /// Preselect a repository (owner/name). Repeatable.
        #[arg(long = "repo", value_name = "OWNER/NAME")]
        repos: Vec<String>,
    },

    /// Ask a single question using a token from GITHUB_TOKEN.
    Ask {
        /// The question to ask.
        question: String,

        /// Repository to query (owner/name). Repeatable.
        #[arg(long = "repo", value_name = "OWNER/NAME", required = true)]
        repos: Vec<String>,

        /// Submit the repositories for indexing before asking.
        #[arg(long)]
        index: bool,
    },

    /// Manage client identifiers and API keys in the OS keychain.
    Secret {
        #[command(subcommand)]
        action: SecretCommand,
    },

    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SecretCommand {
    /// Store a secret in the keychain (prompts with hidden input).
    Set {
        /// GITHUB_CLIENT_ID, GITHUB_CLIENT_SECRET or GREPTILE_API_KEY.
        key: String,

        /// Value for scripts; omit to be prompted.
        #[arg(long)]
        value: Option<String>,
    },

    /// Remove a secret from the keychain.
    #[command(alias = "rm")]
    Delete {
        key: String,
    },

    /// Show where each required secret is resolved from.
    Status,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,

    /// Print the path of config.toml.
    Path,
}

/// Write the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "grepchat", out);
}
