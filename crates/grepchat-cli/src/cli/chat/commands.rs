//! Slash command parsing for the chat loop.

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Show the conversation so far.
    History,
    /// List the repositories being queried.
    Repos,
    /// Sign out and return to the sign-in prompt.
    SignOut,
    Exit,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`, so questions are
/// never mistaken for commands.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/history" => Some(ChatCommand::History),
        "/repos" | "/repositories" => Some(ChatCommand::Repos),
        "/signout" | "/logout" => Some(ChatCommand::SignOut),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}     {}", style("/help").cyan(), "Show this help message");
    println!("  {}    {}", style("/clear").cyan(), "Clear the screen");
    println!("  {}  {}", style("/history").cyan(), "Show the conversation so far");
    println!("  {}    {}", style("/repos").cyan(), "List the repositories being queried");
    println!("  {}  {}", style("/signout").cyan(), "Sign out and start over");
    println!("  {}     {}", style("/exit").cyan(), "End the chat session");
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/q"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_is_case_insensitive_and_ignores_arguments() {
        assert_eq!(parse("  /SignOut now"), Some(ChatCommand::SignOut));
        assert_eq!(parse("/REPOS"), Some(ChatCommand::Repos));
    }

    #[test]
    fn test_parse_history_and_clear() {
        assert_eq!(parse("/history"), Some(ChatCommand::History));
        assert_eq!(parse("/cls"), Some(ChatCommand::Clear));
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("what does src/main.rs do?"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo"), Some(ChatCommand::Unknown("/foo".to_string())));
    }
}
