use ww::NetworkFamily;

use crate::context_store::ContextState;
use crate::error::Result;
use crate::output::PrefsData;

pub fn show(state: &ContextState) -> PrefsData {
	PrefsData {
		preferences: state.preferences().all(),
		cleared: Vec::new(),
	}
}

/// Forgets `family`'s wallet, or every remembered wallet.
pub fn clear(state: &ContextState, family: Option<NetworkFamily>) -> Result<PrefsData> {
	let preferences = state.preferences();
	let before = preferences.all();
	preferences.forget(family)?;
	let after = preferences.all();

	let cleared = before.into_keys().filter(|family| !after.contains_key(family)).collect();
	Ok(PrefsData {
		preferences: after,
		cleared,
	})
}
