//! Welcome banner shown when the chat starts.

use console::style;

use grepchat_types::repository::Selection;

/// Print who is signed in and which repositories the chat covers.
pub fn print_welcome_banner(login: &str, selection: &Selection, branch: &str) {
    println!();
    println!("  {} {}", style("Welcome,").bold(), style(login).cyan().bold());
    println!();
    println!(
        "  {}  {}",
        style("Repositories:").bold(),
        style(selection.len()).dim()
    );
    for repo in selection {
        println!("    {} {}", style("-").dim(), style(repo.full_name()).cyan());
    }
    println!("  {}  {}", style("Branch:").bold(), style(branch).dim());
    println!();
    println!(
        "  {}",
        style("Ask anything about the code. Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
