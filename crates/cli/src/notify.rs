//! Status banner for the terminal.

use colored::Colorize;
use ww::{Notifier, Severity};

/// Prints notifications to stderr, colored by severity.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

fn render(message: &str, severity: Severity) -> String {
	match severity {
		Severity::Info => format!("{} {message}", "info:".cyan().bold()),
		Severity::Success => format!("{} {message}", "ok:".green().bold()),
		Severity::Warning => format!("{} {message}", "warning:".yellow().bold()),
		Severity::Error => format!("{} {message}", "error:".red().bold()),
	}
}

impl Notifier for ConsoleNotifier {
	fn notify(&self, message: &str, severity: Severity) {
		eprintln!("{}", render(message, severity));
	}
}
