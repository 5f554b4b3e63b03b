//! State that outlives one `ww` invocation.
//!
//! * `config.json`: a [`WalletConfig`]; absent means defaults.
//! * `storage.json`: what the site keeps in `localStorage` (wallet
//!   preferences and the last-connected marker), through [`FileStore`].

use std::path::Path;
use std::rc::Rc;

use ww::{PreferenceStore, WalletConfig};

use crate::error::{CliError, Result};

pub mod storage;

#[cfg(test)]
mod tests;

pub use storage::{FileStore, StatePaths};

#[derive(Debug)]
pub struct ContextState {
	paths: StatePaths,
	config: WalletConfig,
	store: Rc<FileStore>,
}

impl ContextState {
	pub fn load(state_dir: Option<&Path>) -> Result<Self> {
		let paths = StatePaths::new(state_dir);
		let config = match storage::read_optional(&paths.config)? {
			None => WalletConfig::default(),
			Some(content) => serde_json::from_str(&content).map_err(|source| CliError::Config {
				path: paths.config.clone(),
				source,
			})?,
		};
		let store = Rc::new(FileStore::open(&paths.storage)?);

		tracing::debug!(target = "ww.cli", root = %paths.root.display(), "state loaded");
		Ok(Self { paths, config, store })
	}

	pub fn paths(&self) -> &StatePaths {
		&self.paths
	}

	pub fn config(&self) -> &WalletConfig {
		&self.config
	}

	/// Config with per-invocation overrides applied.
	pub fn effective_config(&self, fresh_approval: Option<bool>) -> WalletConfig {
		let config = self.config.clone();
		match fresh_approval {
			Some(enabled) => config.with_force_fresh_approval(enabled),
			None => config,
		}
	}

	pub fn store(&self) -> Rc<FileStore> {
		self.store.clone()
	}

	pub fn preferences(&self) -> PreferenceStore {
		PreferenceStore::new(self.store.clone())
	}
}
