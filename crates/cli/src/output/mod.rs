//! Result envelope printed on stdout by every command.
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "ok": true,
//!   "command": "connect",
//!   "data": { "session": { "status": "connected", "account": "0xabc", ... } },
//!   "timings": { "durationMs": 12 }
//! }
//! ```
//!
//! On failure `data` is replaced by
//! `"error": { "code": "NO_PROVIDER_FOUND", "message": "...", "details": {...} }`.


use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use ww::{DeviceProfile, ProviderDescriptor, SessionEvent, SessionSnapshot};
use ww_protocol::NetworkFamily;

/// Bumped on breaking changes to the envelope.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Pretty JSON
	#[default]
	Json,
	/// TOON (compact, token-efficient)
	Toon,
	/// Human-readable text
	Text,
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Toon => write!(f, "toon"),
			OutputFormat::Text => write!(f, "text"),
		}
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub schema_version: Option<u32>,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Stable codes for scripts. The connection codes match
/// [`ww::ConnectError::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	NoProviderFound,
	SelectionCancelled,
	UserRejected,
	NoAccountsReturned,
	NoPublicKeyFound,
	UnsupportedResponseShape,
	ChainSwitchRejected,
	ChainAddRejected,
	ProviderFailure,
	DeepLinkTimeout,
	/// Bad flag value or malformed environment file
	InvalidInput,
	/// config.json did not parse
	ConfigError,
	/// storage.json could not be read or written
	StorageError,
	IoError,
	InternalError,
}

impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			ErrorCode::NoProviderFound => "NO_PROVIDER_FOUND",
			ErrorCode::SelectionCancelled => "SELECTION_CANCELLED",
			ErrorCode::UserRejected => "USER_REJECTED",
			ErrorCode::NoAccountsReturned => "NO_ACCOUNTS_RETURNED",
			ErrorCode::NoPublicKeyFound => "NO_PUBLIC_KEY_FOUND",
			ErrorCode::UnsupportedResponseShape => "UNSUPPORTED_RESPONSE_SHAPE",
			ErrorCode::ChainSwitchRejected => "CHAIN_SWITCH_REJECTED",
			ErrorCode::ChainAddRejected => "CHAIN_ADD_REJECTED",
			ErrorCode::ProviderFailure => "PROVIDER_FAILURE",
			ErrorCode::DeepLinkTimeout => "DEEP_LINK_TIMEOUT",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::ConfigError => "CONFIG_ERROR",
			ErrorCode::StorageError => "STORAGE_ERROR",
			ErrorCode::IoError => "IO_ERROR",
			ErrorCode::InternalError => "INTERNAL_ERROR",
		}
	}
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Timings {
			duration_ms: duration.as_millis() as u64,
		}
	}
}

pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	timings: Option<Timings>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Instant::now(),
			timings: None,
		}
	}

	/// Starts timing from `start` instead of now.
	pub fn started_at(mut self, start: Instant) -> Self {
		self.start_time = start;
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn timings(mut self, timings: Timings) -> Self {
		self.timings = Some(timings);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		let timings = self.timings.unwrap_or_else(|| Timings::from(self.start_time.elapsed()));

		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
			timings: Some(timings),
		}
	}
}

pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Toon => {
			if let Ok(value) = serde_json::to_value(result) {
				println!("{}", toon::encode(&value, None));
			}
		}
		OutputFormat::Text => print_result_text(result),
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		if let Some(ref data) = result.data {
			if let Ok(json) = serde_json::to_string_pretty(data) {
				let _ = writeln!(stdout, "{json}");
			}
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(stdout, "Error [{}]: {}", error.code, error.message);
		if let Some(ref details) = error.details {
			if let Ok(json) = serde_json::to_string_pretty(details) {
				let _ = writeln!(stdout, "Details: {json}");
			}
		}
	}
}

pub fn print_error_stderr(error: &CommandError) {
	eprintln!("Error [{}]: {}", error.code, error.message);
}

/// `ww detect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectData {
	pub device: DeviceProfile,
	pub auto_connect_blocked: bool,
	pub families: Vec<FamilyProviders>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyProviders {
	pub family: NetworkFamily,
	pub count: usize,
	pub providers: Vec<ProviderDescriptor>,
	/// Remembered wallet id for this family, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub preferred: Option<String>,
}

/// `ww connect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectData {
	pub session: SessionSnapshot,
	/// Everything the service emitted during the attempt, oldest first.
	pub events: Vec<SessionEvent>,
}

/// `ww disconnect`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectData {
	/// Family of the marker that was cleared, if there was one.
	pub cleared: Option<NetworkFamily>,
}

/// `ww status`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusData {
	/// Family the last session was on; hosts use it as a reconnect hint.
	pub last_connected: Option<NetworkFamily>,
	pub preferences: BTreeMap<NetworkFamily, String>,
	pub state_dir: PathBuf,
}

/// `ww prefs show|clear`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefsData {
	pub preferences: BTreeMap<NetworkFamily, String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub cleared: Vec<NetworkFamily>,
}
