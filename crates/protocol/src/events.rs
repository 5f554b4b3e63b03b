use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::ChainId;

/// Event emitted by an injected provider through `provider.on(name, listener)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ProviderEvent {
	AccountsChanged(Vec<String>),
	/// Raw chain id as the provider reported it (hex string).
	ChainChanged(String),
	Disconnect,
}

impl ProviderEvent {
	/// Event names to subscribe to with `provider.on`.
	pub const NAMES: [&'static str; 3] = ["accountsChanged", "chainChanged", "disconnect"];

	/// Builds an event from a listener invocation. Unknown names and
	/// malformed payloads yield `None`.
	pub fn from_listener(name: &str, payload: &Value) -> Option<Self> {
		match name {
			"accountsChanged" => {
				let accounts = payload
					.as_array()?
					.iter()
					.filter_map(|a| a.as_str().map(str::to_string))
					.collect();
				Some(ProviderEvent::AccountsChanged(accounts))
			}
			"chainChanged" => match payload {
				Value::String(s) => Some(ProviderEvent::ChainChanged(s.clone())),
				Value::Number(n) => n.as_u64().map(|n| ProviderEvent::ChainChanged(ChainId(n).to_hex())),
				_ => None,
			},
			"disconnect" => Some(ProviderEvent::Disconnect),
			_ => None,
		}
	}

	pub fn chain_id(&self) -> Option<ChainId> {
		match self {
			ProviderEvent::ChainChanged(raw) => ChainId::parse_hex(raw),
			_ => None,
		}
	}
}
