use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Network family a wallet provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkFamily {
	/// EIP-1193 providers (`window.ethereum`).
	Evm,
	/// Solana wallet adapters (`window.solana`, `window.phantom.solana`, ...).
	Solana,
}

impl NetworkFamily {
	pub const ALL: [NetworkFamily; 2] = [NetworkFamily::Evm, NetworkFamily::Solana];

	/// Value written under the last-connected marker key.
	///
	/// EVM sessions are recorded as `base` since Base is the only EVM target
	/// the site connects to.
	pub fn marker(self) -> &'static str {
		match self {
			NetworkFamily::Evm => "base",
			NetworkFamily::Solana => "solana",
		}
	}

	/// Parses a marker value; unknown values are ignored rather than rejected.
	pub fn from_marker(value: &str) -> Option<Self> {
		value.parse().ok()
	}

	pub fn label(self) -> &'static str {
		match self {
			NetworkFamily::Evm => "Base",
			NetworkFamily::Solana => "Solana",
		}
	}
}

impl fmt::Display for NetworkFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NetworkFamily::Evm => write!(f, "evm"),
			NetworkFamily::Solana => write!(f, "solana"),
		}
	}
}

impl FromStr for NetworkFamily {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"evm" | "base" | "ethereum" | "eth" => Ok(NetworkFamily::Evm),
			"solana" | "sol" => Ok(NetworkFamily::Solana),
			_ => Err(format!("unknown network family: {s}")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn marker_round_trips_through_parse() {
		for family in NetworkFamily::ALL {
			assert_eq!(NetworkFamily::from_marker(family.marker()), Some(family));
		}
	}

	#[test]
	fn parse_accepts_aliases() {
		assert_eq!("Base".parse::<NetworkFamily>(), Ok(NetworkFamily::Evm));
		assert_eq!("ethereum".parse::<NetworkFamily>(), Ok(NetworkFamily::Evm));
		assert_eq!(" SOL ".parse::<NetworkFamily>(), Ok(NetworkFamily::Solana));
		assert!("bitcoin".parse::<NetworkFamily>().is_err());
	}

	#[test]
	fn serializes_lowercase() {
		let json = serde_json::to_string(&NetworkFamily::Solana).unwrap();
		assert_eq!(json, "\"solana\"");
	}
}
