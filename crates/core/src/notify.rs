//! User-facing status notifications.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Info,
	Success,
	Warning,
	Error,
}

/// Status banner sink (`showStatus(message, type)` on the page).
pub trait Notifier {
	fn notify(&self, message: &str, severity: Severity);
}

/// Sends notifications to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
	fn notify(&self, message: &str, severity: Severity) {
		match severity {
			Severity::Info | Severity::Success => {
				tracing::info!(target = "ww.notify", ?severity, "{message}")
			}
			Severity::Warning => tracing::warn!(target = "ww.notify", "{message}"),
			Severity::Error => tracing::error!(target = "ww.notify", "{message}"),
		}
	}
}

/// Keeps every notification; hosts that render after the fact read them back.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
	entries: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn entries(&self) -> Vec<(Severity, String)> {
		self.entries.lock().clone()
	}

	pub fn last(&self) -> Option<(Severity, String)> {
		self.entries.lock().last().cloned()
	}
}

impl Notifier for RecordingNotifier {
	fn notify(&self, message: &str, severity: Severity) {
		self.entries.lock().push((severity, message.to_string()));
	}
}
