//! Serde description of a page and its injected wallets.
//!
//! ```json
//! {
//!   "userAgent": "Mozilla/5.0 (iPhone; ...) Phantom/ios",
//!   "pageUrl": "https://wildwest.example/launch",
//!   "ethereum": {
//!     "flags": ["isMetaMask"],
//!     "accounts": ["0xabc..."],
//!     "chainId": "0x1",
//!     "providers": [ { "flags": ["isCoinbaseWallet"], "accounts": ["0xdef..."] } ]
//!   },
//!   "solana": {
//!     "solana": { "flags": ["isPhantom"], "publicKey": "9xQe..." },
//!     "phantom": { "alias": "solana" }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ww_protocol::{ChainId, ProviderRpcError};

use crate::environment::SolanaNamespace;

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

pub const DEFAULT_PAGE_URL: &str = "https://wildwest.example/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentFixture {
	pub user_agent: String,
	pub page_url: Option<String>,
	pub auto_connect_blocked: bool,
	pub ethereum: Option<EthereumFixture>,
	pub solana: BTreeMap<SolanaNamespace, SolanaSlot>,
}

impl Default for EnvironmentFixture {
	fn default() -> Self {
		Self {
			user_agent: DESKTOP_USER_AGENT.to_string(),
			page_url: Some(DEFAULT_PAGE_URL.to_string()),
			auto_connect_blocked: false,
			ethereum: None,
			solana: BTreeMap::new(),
		}
	}
}

impl EnvironmentFixture {
	pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
		self.user_agent = ua.into();
		self
	}

	pub fn with_ethereum(mut self, root: EvmWalletFixture) -> Self {
		self.ethereum = Some(EthereumFixture { root, providers: None });
		self
	}

	/// `window.ethereum.providers`; the root keeps the first entry's behavior.
	pub fn with_evm_providers(mut self, providers: Vec<EvmWalletFixture>) -> Self {
		let root = providers.first().cloned().unwrap_or_default();
		self.ethereum = Some(EthereumFixture {
			root,
			providers: Some(providers),
		});
		self
	}

	pub fn with_solana(mut self, namespace: SolanaNamespace, wallet: SolanaWalletFixture) -> Self {
		self.solana.insert(namespace, SolanaSlot::Wallet(wallet));
		self
	}

	/// Makes `namespace` resolve to the same object as `target`.
	pub fn with_solana_alias(mut self, namespace: SolanaNamespace, target: SolanaNamespace) -> Self {
		self.solana.insert(namespace, SolanaSlot::Alias { alias: target });
		self
	}

	pub fn blocked(mut self) -> Self {
		self.auto_connect_blocked = true;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthereumFixture {
	#[serde(flatten)]
	pub root: EvmWalletFixture,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub providers: Option<Vec<EvmWalletFixture>>,
}

/// Behavior of one scripted EIP-1193 wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvmWalletFixture {
	pub flags: Vec<String>,
	pub accounts: Vec<String>,
	/// Chain the wallet is on before any switch.
	pub chain_id: ChainId,
	/// Chains the wallet can switch to without adding. The current chain is
	/// always included.
	pub known_chains: Vec<ChainId>,
	/// Reject `eth_requestAccounts` with 4001.
	pub reject_accounts: bool,
	/// Fail `wallet_switchEthereumChain` with this error instead of the
	/// default behavior.
	pub switch_error: Option<ProviderRpcError>,
	/// Fail `wallet_addEthereumChain` with this error.
	pub add_error: Option<ProviderRpcError>,
}

impl Default for EvmWalletFixture {
	fn default() -> Self {
		Self {
			flags: Vec::new(),
			accounts: Vec::new(),
			chain_id: ChainId::ETHEREUM,
			known_chains: Vec::new(),
			reject_accounts: false,
			switch_error: None,
			add_error: None,
		}
	}
}

impl EvmWalletFixture {
	pub fn new(flags: &[&str]) -> Self {
		Self {
			flags: flags.iter().map(|f| f.to_string()).collect(),
			..Default::default()
		}
	}

	pub fn with_accounts(mut self, accounts: &[&str]) -> Self {
		self.accounts = accounts.iter().map(|a| a.to_string()).collect();
		self
	}

	pub fn on_chain(mut self, chain_id: ChainId) -> Self {
		self.chain_id = chain_id;
		self
	}

	pub fn knows(mut self, chain_id: ChainId) -> Self {
		self.known_chains.push(chain_id);
		self
	}

	pub fn rejecting_accounts(mut self) -> Self {
		self.reject_accounts = true;
		self
	}

	pub fn failing_switch(mut self, error: ProviderRpcError) -> Self {
		self.switch_error = Some(error);
		self
	}

	pub fn failing_add(mut self, error: ProviderRpcError) -> Self {
		self.add_error = Some(error);
		self
	}
}

/// A Solana namespace either holds its own adapter or points at another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SolanaSlot {
	Alias { alias: SolanaNamespace },
	Wallet(SolanaWalletFixture),
}

/// Behavior of one scripted Solana adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolanaWalletFixture {
	pub flags: Vec<String>,
	pub public_key: Option<String>,
	/// Raw value `connect()` resolves with. Defaults to `{ publicKey }`.
	pub connect_response: Option<Value>,
	/// Whether `publicKey` is readable on the adapter after connecting.
	pub expose_public_key: bool,
	/// Reject `connect()` with 4001.
	pub reject_connect: bool,
	/// Whether the adapter has a `request()` method.
	pub supports_request: bool,
	pub fail_disconnect: bool,
}

impl Default for SolanaWalletFixture {
	fn default() -> Self {
		Self {
			flags: Vec::new(),
			public_key: None,
			connect_response: None,
			expose_public_key: true,
			reject_connect: false,
			supports_request: false,
			fail_disconnect: false,
		}
	}
}

impl SolanaWalletFixture {
	pub fn new(flags: &[&str], public_key: &str) -> Self {
		Self {
			flags: flags.iter().map(|f| f.to_string()).collect(),
			public_key: Some(public_key.to_string()),
			..Default::default()
		}
	}

	pub fn responding(mut self, response: Value) -> Self {
		self.connect_response = Some(response);
		self
	}

	pub fn hiding_public_key(mut self) -> Self {
		self.expose_public_key = false;
		self
	}

	pub fn rejecting_connect(mut self) -> Self {
		self.reject_connect = true;
		self
	}

	pub fn with_request(mut self) -> Self {
		self.supports_request = true;
		self
	}

	pub fn failing_disconnect(mut self) -> Self {
		self.fail_disconnect = true;
		self
	}
}
