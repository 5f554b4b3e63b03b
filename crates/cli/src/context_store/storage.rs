//! On-disk state: where it lives and the `storage.json` key/value file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use ww_runtime::KeyValueStore;

/// Files under the state directory.
#[derive(Debug, Clone)]
pub struct StatePaths {
	pub root: PathBuf,
	/// [`ww::WalletConfig`] as JSON.
	pub config: PathBuf,
	/// Preferences and the last-connected marker.
	pub storage: PathBuf,
}

impl StatePaths {
	/// `override_dir`, else `$XDG_CONFIG_HOME/ww` (or the platform config dir).
	pub fn new(override_dir: Option<&Path>) -> Self {
		let root = match override_dir {
			Some(dir) => dir.to_path_buf(),
			None => dirs::config_dir()
				.unwrap_or_else(|| PathBuf::from("."))
				.join("ww"),
		};

		Self {
			config: root.join("config.json"),
			storage: root.join("storage.json"),
			root,
		}
	}
}

/// File contents, or `None` if it does not exist yet.
pub(crate) fn read_optional(path: &Path) -> std::io::Result<Option<String>> {
	match fs::read_to_string(path) {
		Ok(content) => Ok(Some(content)),
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
		Err(err) => Err(err),
	}
}

pub(crate) fn save_json<T: serde::Serialize>(path: &Path, data: &T) -> std::io::Result<()> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)?;
	}
	// write-then-rename so a crash never leaves half a file behind
	let tmp = path.with_extension("json.tmp");
	fs::write(&tmp, serde_json::to_string_pretty(data)?)?;
	fs::rename(&tmp, path)
}

/// [`KeyValueStore`] persisted as a flat JSON object, rewritten on every
/// change. Plays the part of the browser's `localStorage`.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
	/// Loads `path`; a missing file is an empty store.
	pub fn open(path: impl Into<PathBuf>) -> ww_runtime::Result<Self> {
		let path = path.into();
		let storage_error = |err: &dyn std::fmt::Display| ww_runtime::Error::Storage(format!("{}: {err}", path.display()));
		let entries = match read_optional(&path).map_err(|err| storage_error(&err))? {
			None => BTreeMap::new(),
			Some(content) => serde_json::from_str(&content).map_err(|err| storage_error(&err))?,
		};
		tracing::debug!(target = "ww.cli", path = %path.display(), keys = entries.len(), "storage loaded");
		Ok(Self {
			path,
			entries: Mutex::new(entries),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn flush(&self, entries: &BTreeMap<String, String>) -> ww_runtime::Result<()> {
		save_json(&self.path, entries)
			.map_err(|err| ww_runtime::Error::Storage(format!("{}: {err}", self.path.display())))
	}
}

impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> ww_runtime::Result<Option<String>> {
		Ok(self.entries.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> ww_runtime::Result<()> {
		let mut entries = self.entries.lock();
		entries.insert(key.to_string(), value.to_string());
		self.flush(&entries)
	}

	fn remove(&self, key: &str) -> ww_runtime::Result<()> {
		let mut entries = self.entries.lock();
		if entries.remove(key).is_none() {
			return Ok(());
		}
		self.flush(&entries)
	}
}
