use std::path::PathBuf;

use thiserror::Error;
use ww::{ConnectError, SessionEvent};

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	/// A connection attempt failed; `events` is what the service emitted
	/// on the way, install guidance included.
	#[error("{source}")]
	Connect {
		#[source]
		source: ConnectError,
		events: Vec<SessionEvent>,
	},

	#[error("invalid environment file {path}: {source}")]
	Environment {
		path: PathBuf,
		#[source]
		source: ww_runtime::Error,
	},

	#[error("invalid config {path}: {source}")]
	Config {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("storage failed: {0}")]
	Storage(#[from] ww_runtime::Error),

	#[error("{0}")]
	InvalidInput(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl From<ConnectError> for CliError {
	fn from(source: ConnectError) -> Self {
		CliError::Connect {
			source,
			events: Vec::new(),
		}
	}
}

fn connect_code(err: &ConnectError) -> ErrorCode {
	match err {
		ConnectError::NoProviderFound { .. } => ErrorCode::NoProviderFound,
		ConnectError::SelectionCancelled => ErrorCode::SelectionCancelled,
		ConnectError::UserRejected { .. } => ErrorCode::UserRejected,
		ConnectError::NoAccountsReturned => ErrorCode::NoAccountsReturned,
		ConnectError::NoPublicKeyFound => ErrorCode::NoPublicKeyFound,
		ConnectError::UnsupportedResponseShape { .. } => ErrorCode::UnsupportedResponseShape,
		ConnectError::ChainSwitchRejected { .. } => ErrorCode::ChainSwitchRejected,
		ConnectError::ChainAddRejected { .. } => ErrorCode::ChainAddRejected,
		ConnectError::ProviderFailure { .. } => ErrorCode::ProviderFailure,
		ConnectError::DeepLinkTimeout { .. } => ErrorCode::DeepLinkTimeout,
	}
}

/// Provider-level details worth handing to scripts.
fn connect_details(err: &ConnectError) -> serde_json::Value {
	let mut details = serde_json::json!({ "reason": err.to_string() });
	match err {
		ConnectError::NoProviderFound { family } => {
			details["family"] = serde_json::json!(family);
		}
		ConnectError::ChainSwitchRejected { chain, code, .. } | ConnectError::ChainAddRejected { chain, code, .. } => {
			details["chainId"] = serde_json::json!(chain.0);
			details["providerCode"] = serde_json::json!(code);
		}
		ConnectError::ProviderFailure { code, .. } => {
			details["providerCode"] = serde_json::json!(code);
		}
		ConnectError::DeepLinkTimeout { timeout_ms } => {
			details["timeoutMs"] = serde_json::json!(timeout_ms);
		}
		_ => {}
	}
	details
}

impl CliError {
	/// Connection failures were already shown by the service's notifier.
	pub fn already_notified(&self) -> bool {
		matches!(self, CliError::Connect { .. })
	}

	pub fn to_command_error(&self) -> CommandError {
		let (code, message, details) = match self {
			CliError::Connect { source, events } => {
				let mut details = connect_details(source);
				if !events.is_empty() {
					details["events"] = serde_json::json!(events);
				}
				(connect_code(source), source.user_message(), Some(details))
			}
			CliError::Environment { path, source } => (
				ErrorCode::InvalidInput,
				format!("Environment file {} is invalid: {source}", path.display()),
				Some(serde_json::json!({ "path": path })),
			),
			CliError::Config { path, source } => (
				ErrorCode::ConfigError,
				format!("Config file {} is invalid: {source}", path.display()),
				Some(serde_json::json!({ "path": path })),
			),
			CliError::Storage(err) => (ErrorCode::StorageError, err.to_string(), None),
			CliError::InvalidInput(msg) => (ErrorCode::InvalidInput, msg.clone(), None),
			CliError::Io(err) => (ErrorCode::IoError, err.to_string(), None),
			CliError::Json(err) => (ErrorCode::InternalError, format!("JSON error: {err}"), None),
			CliError::Anyhow(err) => (ErrorCode::InternalError, format!("{err:#}"), None),
		};

		CommandError { code, message, details }
	}
}

#[cfg(test)]
mod tests {
	use ww_protocol::{ChainId, NetworkFamily};

	use super::*;

	#[test]
	fn connect_errors_keep_their_code_and_user_message() {
		let err = CliError::from(ConnectError::NoProviderFound {
			family: NetworkFamily::Solana,
		});
		let cmd = err.to_command_error();

		assert_eq!(cmd.code, ErrorCode::NoProviderFound);
		assert_eq!(
			cmd.message,
			"Connection failed. Please install a Solana wallet like Phantom or Solflare."
		);
		assert_eq!(cmd.details.unwrap()["family"], "solana");
	}

	#[test]
	fn codes_agree_with_the_core_taxonomy() {
		let errors = [
			ConnectError::SelectionCancelled,
			ConnectError::NoAccountsReturned,
			ConnectError::DeepLinkTimeout { timeout_ms: 30_000 },
			ConnectError::ChainAddRejected {
				chain: ChainId::BASE,
				code: Some(-32603),
				message: "nope".into(),
			},
		];
		for err in errors {
			assert_eq!(connect_code(&err).as_str(), err.code());
		}
	}

	#[test]
	fn chain_errors_carry_chain_and_provider_code() {
		let err = CliError::from(ConnectError::ChainSwitchRejected {
			chain: ChainId::BASE,
			code: Some(4001),
			message: "User rejected the request.".into(),
		});
		let details = err.to_command_error().details.unwrap();

		assert_eq!(details["chainId"], 8453);
		assert_eq!(details["providerCode"], 4001);
		assert!(details.get("events").is_none());
	}

	#[test]
	fn attempt_events_ride_along_in_details() {
		let err = CliError::Connect {
			source: ConnectError::SelectionCancelled,
			events: vec![SessionEvent::Connecting {
				family: NetworkFamily::Evm,
			}],
		};
		let cmd = err.to_command_error();

		assert_eq!(cmd.code, ErrorCode::SelectionCancelled);
		assert_eq!(cmd.message, "Connection was cancelled.");
		assert_eq!(cmd.details.unwrap()["events"][0]["type"], "connecting");
	}
}
