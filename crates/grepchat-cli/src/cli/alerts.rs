//! Terminal rendering of user-visible alerts.

use console::style;

use grepchat_core::notify::Notifier;
use grepchat_types::alert::{Alert, AlertLevel};

/// Prints alerts to stderr with `console` styling.
///
/// In quiet mode only errors are shown.
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, alert: Alert) {
        if self.quiet && alert.level != AlertLevel::Error {
            return;
        }
        eprintln!("{}", format_alert(&alert));
    }
}

/// One styled line: marker, bold title, dim message.
pub fn format_alert(alert: &Alert) -> String {
    let marker = match alert.level {
        AlertLevel::Info => style("i").blue().bold(),
        AlertLevel::Warning => style("!").yellow().bold(),
        AlertLevel::Error => style("x").red().bold(),
    };
    format!(
        "  {} {} {}",
        marker,
        style(&alert.title).bold(),
        style(&alert.message).dim()
    )
}
