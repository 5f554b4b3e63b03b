//! The persisted side of a session. Live sessions end with the process, so
//! what remains between runs is the last-connected marker.

use ww::Notifier;

use crate::context_store::ContextState;
use crate::error::Result;
use crate::notify::ConsoleNotifier;
use crate::output::{DisconnectData, StatusData};

pub fn disconnect(state: &ContextState) -> Result<DisconnectData> {
	let preferences = state.preferences();
	let cleared = preferences.marker();
	preferences.clear_marker()?;

	if let Some(family) = cleared {
		tracing::info!(target = "ww.cli", %family, "cleared connection marker");
		ConsoleNotifier.notify("Wallet disconnected", ww::Severity::Info);
	}
	Ok(DisconnectData { cleared })
}

pub fn status(state: &ContextState) -> StatusData {
	let preferences = state.preferences();
	StatusData {
		last_connected: preferences.marker(),
		preferences: preferences.all(),
		state_dir: state.paths().root.clone(),
	}
}
