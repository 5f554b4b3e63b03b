//! Persisted wallet preference and last-connected marker.

use std::collections::BTreeMap;
use std::rc::Rc;

use ww_protocol::NetworkFamily;
use ww_runtime::{KeyValueStore, Result};

/// JSON object mapping family marker to preferred provider id.
pub const PREFERENCES_KEY: &str = "wild-west-wallet-preferences";

/// Family marker of the last successful connection (`base` / `solana`).
pub const MARKER_KEY: &str = "wildwest_wallet_connected";

#[derive(Clone)]
pub struct PreferenceStore {
	store: Rc<dyn KeyValueStore>,
}

impl PreferenceStore {
	pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
		Self { store }
	}

	/// All remembered preferences. Unreadable or malformed data reads as empty.
	pub fn all(&self) -> BTreeMap<NetworkFamily, String> {
		let raw = match self.store.get(PREFERENCES_KEY) {
			Ok(Some(raw)) => raw,
			Ok(None) => return BTreeMap::new(),
			Err(err) => {
				tracing::warn!(target = "ww.preferences", error = %err, "failed to read wallet preferences");
				return BTreeMap::new();
			}
		};

		match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
			Ok(map) => map
				.into_iter()
				.filter_map(|(key, id)| NetworkFamily::from_marker(&key).map(|family| (family, id)))
				.collect(),
			Err(err) => {
				tracing::warn!(target = "ww.preferences", error = %err, "ignoring malformed wallet preferences");
				BTreeMap::new()
			}
		}
	}

	pub fn preferred(&self, family: NetworkFamily) -> Option<String> {
		self.all().remove(&family)
	}

	pub fn remember(&self, family: NetworkFamily, provider_id: &str) -> Result<()> {
		let mut prefs = self.all();
		prefs.insert(family, provider_id.to_string());
		self.save(&prefs)?;
		tracing::debug!(target = "ww.preferences", %family, provider_id, "remembered wallet preference");
		Ok(())
	}

	/// Drops the preference for `family`, or every preference when `None`.
	pub fn forget(&self, family: Option<NetworkFamily>) -> Result<()> {
		match family {
			None => self.store.remove(PREFERENCES_KEY),
			Some(family) => {
				let mut prefs = self.all();
				if prefs.remove(&family).is_none() {
					return Ok(());
				}
				if prefs.is_empty() {
					self.store.remove(PREFERENCES_KEY)
				} else {
					self.save(&prefs)
				}
			}
		}
	}

	fn save(&self, prefs: &BTreeMap<NetworkFamily, String>) -> Result<()> {
		let by_marker: BTreeMap<&str, &str> = prefs
			.iter()
			.map(|(family, id)| (family.marker(), id.as_str()))
			.collect();
		self.store.set(PREFERENCES_KEY, &serde_json::to_string(&by_marker)?)
	}

	pub fn marker(&self) -> Option<NetworkFamily> {
		match self.store.get(MARKER_KEY) {
			Ok(value) => value.as_deref().and_then(NetworkFamily::from_marker),
			Err(err) => {
				tracing::warn!(target = "ww.preferences", error = %err, "failed to read connection marker");
				None
			}
		}
	}

	pub fn set_marker(&self, family: NetworkFamily) -> Result<()> {
		self.store.set(MARKER_KEY, family.marker())
	}

	pub fn clear_marker(&self) -> Result<()> {
		self.store.remove(MARKER_KEY)
	}
}

#[cfg(test)]
mod tests {
	use ww_runtime::MemoryStore;

	use super::*;

	fn prefs() -> (PreferenceStore, Rc<MemoryStore>) {
		let store = Rc::new(MemoryStore::new());
		(PreferenceStore::new(store.clone()), store)
	}

	#[test]
	fn remember_writes_marker_keyed_json() {
		let (prefs, store) = prefs();
		prefs.remember(NetworkFamily::Evm, "coinbase").unwrap();
		prefs.remember(NetworkFamily::Solana, "phantom").unwrap();

		let raw = store.get(PREFERENCES_KEY).unwrap().unwrap();
		assert_eq!(raw, r#"{"base":"coinbase","solana":"phantom"}"#);
		assert_eq!(prefs.preferred(NetworkFamily::Evm).as_deref(), Some("coinbase"));
	}

	#[test]
	fn forget_one_family_or_all() {
		let (prefs, store) = prefs();
		prefs.remember(NetworkFamily::Evm, "metamask").unwrap();
		prefs.remember(NetworkFamily::Solana, "solflare").unwrap();

		prefs.forget(Some(NetworkFamily::Evm)).unwrap();
		assert_eq!(prefs.preferred(NetworkFamily::Evm), None);
		assert_eq!(prefs.preferred(NetworkFamily::Solana).as_deref(), Some("solflare"));

		prefs.forget(Some(NetworkFamily::Solana)).unwrap();
		assert_eq!(store.get(PREFERENCES_KEY).unwrap(), None);

		prefs.remember(NetworkFamily::Evm, "metamask").unwrap();
		prefs.forget(None).unwrap();
		assert!(prefs.all().is_empty());
	}

	#[test]
	fn malformed_preferences_read_as_empty() {
		let store = Rc::new(MemoryStore::new().with_entry(PREFERENCES_KEY, "not json"));
		let prefs = PreferenceStore::new(store);
		assert!(prefs.all().is_empty());
		prefs.remember(NetworkFamily::Solana, "phantom").unwrap();
		assert_eq!(prefs.preferred(NetworkFamily::Solana).as_deref(), Some("phantom"));
	}

	#[test]
	fn marker_round_trip() {
		let (prefs, store) = prefs();
		assert_eq!(prefs.marker(), None);
		prefs.set_marker(NetworkFamily::Evm).unwrap();
		assert_eq!(store.get(MARKER_KEY).unwrap().as_deref(), Some("base"));
		assert_eq!(prefs.marker(), Some(NetworkFamily::Evm));
		prefs.clear_marker().unwrap();
		assert_eq!(prefs.marker(), None);
	}

	#[test]
	fn unknown_marker_value_is_ignored() {
		let store = Rc::new(MemoryStore::new().with_entry(MARKER_KEY, "bitcoin"));
		assert_eq!(PreferenceStore::new(store).marker(), None);
	}
}
