//! The single connection session and its transitions.
//!
//! Only [`WalletService`](crate::WalletService) holds a [`ConnectionSession`];
//! everything else sees [`SessionSnapshot`]s.

use serde::Serialize;
use ww_protocol::{ChainRef, NetworkFamily};

use crate::registry::ProviderDescriptor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
	#[default]
	Disconnected,
	Connecting,
	Connected,
}

/// Account and provider of a live session. Held as one value so a session
/// can never have one without the other.
#[derive(Debug, Clone)]
pub struct Binding {
	pub account: String,
	pub family: NetworkFamily,
	pub chain: ChainRef,
	pub provider: ProviderDescriptor,
}

#[derive(Debug, Default)]
pub struct ConnectionSession {
	status: SessionStatus,
	binding: Option<Binding>,
}

impl ConnectionSession {
	pub fn status(&self) -> SessionStatus {
		self.status
	}

	pub fn binding(&self) -> Option<&Binding> {
		self.binding.as_ref()
	}

	pub fn is_connected(&self) -> bool {
		self.status == SessionStatus::Connected
	}

	/// Disconnected -> Connecting.
	pub(crate) fn begin(&mut self) {
		debug_assert!(self.binding.is_none(), "begin() on a bound session");
		self.status = SessionStatus::Connecting;
	}

	/// Connecting -> Connected.
	pub(crate) fn establish(&mut self, binding: Binding) {
		self.status = SessionStatus::Connected;
		self.binding = Some(binding);
	}

	/// Any state -> Disconnected, clearing every field at once. Returns the
	/// binding that was dropped, if any.
	pub(crate) fn reset(&mut self) -> Option<Binding> {
		self.status = SessionStatus::Disconnected;
		self.binding.take()
	}

	pub(crate) fn set_account(&mut self, account: String) -> bool {
		match &mut self.binding {
			Some(binding) if binding.account != account => {
				binding.account = account;
				true
			}
			_ => false,
		}
	}

	pub(crate) fn set_chain(&mut self, chain: ChainRef) -> bool {
		match &mut self.binding {
			Some(binding) if binding.chain != chain => {
				binding.chain = chain;
				true
			}
			_ => false,
		}
	}

	pub fn snapshot(&self) -> SessionSnapshot {
		let Some(binding) = &self.binding else {
			return SessionSnapshot {
				status: self.status,
				..SessionSnapshot::default()
			};
		};
		SessionSnapshot {
			status: self.status,
			account: Some(binding.account.clone()),
			family: Some(binding.family),
			chain: Some(binding.chain),
			chain_name: Some(binding.chain.name()),
			provider: Some(ProviderSummary {
				id: binding.provider.id.clone(),
				display_name: binding.provider.display_name.clone(),
			}),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSummary {
	pub id: String,
	pub display_name: String,
}

/// Read-only copy of the session for UI binding and CLI output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
	pub status: SessionStatus,
	pub account: Option<String>,
	pub family: Option<NetworkFamily>,
	pub chain: Option<ChainRef>,
	pub chain_name: Option<String>,
	pub provider: Option<ProviderSummary>,
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use serde_json::json;
	use ww_protocol::ChainId;
	use ww_runtime::scripted::{EnvironmentFixture, EvmWalletFixture, ScriptedEnvironment};

	use super::*;
	use crate::registry::ProviderRegistry;

	fn binding() -> Binding {
		let env = Rc::new(ScriptedEnvironment::new(
			EnvironmentFixture::default().with_ethereum(EvmWalletFixture::new(&["isMetaMask"])),
		));
		let provider = ProviderRegistry::new(env).enumerate(NetworkFamily::Evm).remove(0);
		Binding {
			account: "0xabc".into(),
			family: NetworkFamily::Evm,
			chain: ChainRef::Evm(ChainId::BASE),
			provider,
		}
	}

	#[test]
	fn reset_clears_everything() {
		let mut session = ConnectionSession::default();
		session.begin();
		session.establish(binding());
		assert!(session.is_connected());

		let dropped = session.reset().unwrap();
		assert_eq!(dropped.account, "0xabc");
		assert_eq!(session.snapshot(), SessionSnapshot::default());
		assert!(session.reset().is_none());
	}

	#[test]
	fn account_and_chain_updates_report_change() {
		let mut session = ConnectionSession::default();
		assert!(!session.set_account("0xdef".into()));

		session.begin();
		session.establish(binding());
		assert!(!session.set_account("0xabc".into()));
		assert!(session.set_account("0xdef".into()));
		assert!(session.set_chain(ChainRef::Evm(ChainId::ETHEREUM)));
		assert_eq!(session.snapshot().chain_name.as_deref(), Some("Ethereum"));
	}

	#[test]
	fn snapshot_serializes_camel_case() {
		let mut session = ConnectionSession::default();
		session.begin();
		session.establish(binding());
		assert_eq!(
			serde_json::to_value(session.snapshot()).unwrap(),
			json!({
				"status": "connected",
				"account": "0xabc",
				"family": "evm",
				"chain": "eip155:8453",
				"chainName": "Base",
				"provider": { "id": "metamask", "displayName": "MetaMask" }
			})
		);
	}
}
