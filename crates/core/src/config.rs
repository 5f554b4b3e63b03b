//! Tunables for the connection flow.
//!
//! Everything has a default matching the production site, so an empty JSON
//! object is a valid configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ww_protocol::{AddChainParameter, ChainId, NetworkFamily};

/// What to do when a connected EVM wallet moves to another chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainChangePolicy {
	/// Drop the session unless the new chain is the target chain.
	#[default]
	Disconnect,
	/// Keep the session and record the new chain.
	Follow,
}

/// Floor for [`DeepLinkConfig::poll_interval`].
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeepLinkConfig {
	/// Open the wallet app when no provider is injected on mobile.
	pub enabled: bool,
	pub poll_interval_ms: u64,
	pub timeout_ms: u64,
}

impl Default for DeepLinkConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			poll_interval_ms: 2_000,
			timeout_ms: 30_000,
		}
	}
}

impl DeepLinkConfig {
	/// Never shorter than [`MIN_POLL_INTERVAL_MS`], so a zero setting still
	/// advances toward the timeout.
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConfig {
	/// Chain every EVM session must end up on.
	pub target_chain: AddChainParameter,
	/// Revoke existing trust before connecting so the wallet always shows
	/// its approval popup.
	pub force_fresh_approval: bool,
	/// Pause between the revoke and the new `connect()`.
	pub fresh_settle_ms: u64,
	pub chain_change_policy: ChainChangePolicy,
	pub deep_link: DeepLinkConfig,
	/// Per-family RPC endpoint overrides, consulted before the chain's own list.
	pub endpoints: BTreeMap<NetworkFamily, String>,
}

impl Default for WalletConfig {
	fn default() -> Self {
		Self {
			target_chain: AddChainParameter::base(),
			force_fresh_approval: true,
			fresh_settle_ms: 500,
			chain_change_policy: ChainChangePolicy::default(),
			deep_link: DeepLinkConfig::default(),
			endpoints: BTreeMap::new(),
		}
	}
}

impl WalletConfig {
	pub fn target_chain_id(&self) -> ChainId {
		self.target_chain.chain_id
	}

	pub fn fresh_settle(&self) -> Duration {
		Duration::from_millis(self.fresh_settle_ms)
	}

	pub fn with_target_chain(mut self, chain: AddChainParameter) -> Self {
		self.target_chain = chain;
		self
	}

	pub fn with_force_fresh_approval(mut self, enabled: bool) -> Self {
		self.force_fresh_approval = enabled;
		self
	}

	pub fn with_chain_change_policy(mut self, policy: ChainChangePolicy) -> Self {
		self.chain_change_policy = policy;
		self
	}

	pub fn with_endpoint(mut self, family: NetworkFamily, url: impl Into<String>) -> Self {
		self.endpoints.insert(family, url.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn empty_object_is_default() {
		let config: WalletConfig = serde_json::from_value(json!({})).unwrap();
		assert_eq!(config, WalletConfig::default());
		assert_eq!(config.target_chain_id(), ChainId::BASE);
		assert_eq!(config.deep_link.poll_interval(), Duration::from_secs(2));
		assert_eq!(config.deep_link.timeout(), Duration::from_secs(30));
		assert_eq!(config.fresh_settle(), Duration::from_millis(500));
	}

	#[test]
	fn zero_poll_interval_is_floored() {
		let config: WalletConfig = serde_json::from_value(json!({ "deepLink": { "pollIntervalMs": 0 } })).unwrap();
		assert_eq!(config.deep_link.poll_interval(), Duration::from_millis(MIN_POLL_INTERVAL_MS));
	}

	#[test]
	fn partial_overrides() {
		let config: WalletConfig = serde_json::from_value(json!({
			"forceFreshApproval": false,
			"chainChangePolicy": "follow",
			"deepLink": { "timeoutMs": 5000 },
			"endpoints": { "evm": "https://base.example/rpc" }
		}))
		.unwrap();

		assert!(!config.force_fresh_approval);
		assert_eq!(config.chain_change_policy, ChainChangePolicy::Follow);
		assert_eq!(config.deep_link.timeout_ms, 5000);
		assert_eq!(config.deep_link.poll_interval_ms, 2000);
		assert_eq!(
			config.endpoints.get(&NetworkFamily::Evm).map(String::as_str),
			Some("https://base.example/rpc")
		);
	}
}
