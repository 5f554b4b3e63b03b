use ww::{NetworkFamily, WalletService};

use crate::error::{CliError, Result};
use crate::output::ConnectData;

/// Runs one connection attempt and collects the events it produced.
pub async fn execute(service: &WalletService, family: Option<NetworkFamily>) -> Result<ConnectData> {
	let mut stream = service.subscribe();
	let result = service.try_connect(family).await;
	let events = stream.drain();

	match result {
		Ok(session) => Ok(ConnectData { session, events }),
		Err(source) => Err(CliError::Connect { source, events }),
	}
}
