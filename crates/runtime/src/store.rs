//! String key/value persistence (`localStorage` in the browser).

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use crate::error::Result;

/// Minimal `localStorage`-shaped store.
pub trait KeyValueStore {
	fn get(&self, key: &str) -> Result<Option<String>>;
	fn set(&self, key: &str, value: &str) -> Result<()>;
	fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store; state lives as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.entries.lock().insert(key.into(), value.into());
		self
	}

	/// Sorted copy of everything stored.
	pub fn snapshot(&self) -> BTreeMap<String, String> {
		self.entries
			.lock()
			.iter()
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.entries.lock().insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.entries.lock().remove(key);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_store_basic_ops() {
		let store = MemoryStore::new().with_entry("a", "1");
		assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

		store.set("b", "2").unwrap();
		store.remove("a").unwrap();
		store.remove("missing").unwrap();

		assert_eq!(store.get("a").unwrap(), None);
		assert_eq!(store.snapshot().into_iter().collect::<Vec<_>>(), vec![("b".to_string(), "2".to_string())]);
	}
}
