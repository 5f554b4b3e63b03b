//! Chain identifiers and the EIP-3085 / EIP-3326 parameter objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// EVM chain id. Serialized the way wallets expect it: a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl ChainId {
	pub const ETHEREUM: ChainId = ChainId(1);
	pub const POLYGON: ChainId = ChainId(137);
	pub const BASE: ChainId = ChainId(8453);
	pub const BASE_SEPOLIA: ChainId = ChainId(84532);

	pub fn to_hex(self) -> String {
		format!("{:#x}", self.0)
	}

	/// Parses `0x2105` style hex, or a plain decimal string such as `8453`.
	pub fn parse_hex(value: &str) -> Option<Self> {
		let value = value.trim();
		match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
			Some(hex) => u64::from_str_radix(hex, 16).ok().map(ChainId),
			None => value.parse::<u64>().ok().map(ChainId),
		}
	}

	/// Human name for well-known chains.
	pub fn name(self) -> Option<&'static str> {
		match self.0 {
			1 => Some("Ethereum"),
			137 => Some("Polygon"),
			8453 => Some("Base"),
			84532 => Some("Base Sepolia"),
			_ => None,
		}
	}

	pub fn display_name(self) -> String {
		self.name()
			.map(str::to_string)
			.unwrap_or_else(|| format!("Chain {}", self.0))
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#x}", self.0)
	}
}

impl Serialize for ChainId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_hex())
	}
}

impl<'de> Deserialize<'de> for ChainId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Number(u64),
			Text(String),
		}

		match Raw::deserialize(deserializer)? {
			Raw::Number(n) => Ok(ChainId(n)),
			Raw::Text(s) => ChainId::parse_hex(&s)
				.ok_or_else(|| serde::de::Error::custom(format!("invalid chain id: {s}"))),
		}
	}
}

/// The chain a session is bound to.
///
/// Rendered as a CAIP-2 style string (`eip155:8453`, `solana:mainnet`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainRef {
	Evm(ChainId),
	Solana,
}

impl ChainRef {
	pub fn name(&self) -> String {
		match self {
			ChainRef::Evm(id) => id.display_name(),
			ChainRef::Solana => "Solana".to_string(),
		}
	}

	pub fn evm_id(&self) -> Option<ChainId> {
		match self {
			ChainRef::Evm(id) => Some(*id),
			ChainRef::Solana => None,
		}
	}
}

impl fmt::Display for ChainRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChainRef::Evm(id) => write!(f, "eip155:{}", id.0),
			ChainRef::Solana => write!(f, "solana:mainnet"),
		}
	}
}

impl FromStr for ChainRef {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s == "solana" || s.starts_with("solana:") {
			return Ok(ChainRef::Solana);
		}
		let id = s.strip_prefix("eip155:").unwrap_or(s);
		id.parse::<u64>()
			.ok()
			.map(ChainId)
			.or_else(|| ChainId::parse_hex(id))
			.map(ChainRef::Evm)
			.ok_or_else(|| format!("invalid chain reference: {s}"))
	}
}

impl Serialize for ChainRef {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for ChainRef {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

/// `wallet_switchEthereumChain` parameter (EIP-3326).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParameter {
	pub chain_id: ChainId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
}

impl NativeCurrency {
	pub fn ether() -> Self {
		Self {
			name: "ETH".to_string(),
			symbol: "ETH".to_string(),
			decimals: 18,
		}
	}
}

/// `wallet_addEthereumChain` parameter (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameter {
	pub chain_id: ChainId,
	pub chain_name: String,
	pub native_currency: NativeCurrency,
	pub rpc_urls: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub block_explorer_urls: Vec<String>,
}

impl AddChainParameter {
	/// Base mainnet, as the launchpad registers it.
	pub fn base() -> Self {
		Self {
			chain_id: ChainId::BASE,
			chain_name: "Base".to_string(),
			native_currency: NativeCurrency::ether(),
			rpc_urls: vec!["https://mainnet.base.org".to_string()],
			block_explorer_urls: vec!["https://basescan.org".to_string()],
		}
	}

	pub fn base_sepolia() -> Self {
		Self {
			chain_id: ChainId::BASE_SEPOLIA,
			chain_name: "Base Sepolia".to_string(),
			native_currency: NativeCurrency::ether(),
			rpc_urls: vec!["https://sepolia.base.org".to_string()],
			block_explorer_urls: vec!["https://sepolia.basescan.org".to_string()],
		}
	}

	/// Same chain, with the RPC list replaced by a single resolved endpoint.
	pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self {
		self.rpc_urls = vec![url.into()];
		self
	}
}
