//! Known wallet products and their static metadata.

use std::fmt;

use serde::{Deserialize, Serialize};
use ww_protocol::NetworkFamily;

/// Closed set of wallets the registry can recognize.
///
/// Duck-typed identity flags are turned into one of these exactly once, in
/// the registry. Everything downstream matches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletKind {
	MetaMask,
	CoinbaseWallet,
	Rainbow,
	TrustWallet,
	BraveWallet,
	/// Phantom's EVM provider.
	PhantomEvm,
	/// Unrecognized `window.ethereum` provider.
	GenericEvm,
	Phantom,
	Solflare,
	Glow,
	Slope,
	Backpack,
	/// Unrecognized `window.solana` adapter.
	GenericSolana,
}

/// App store listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreLinks {
	pub ios: &'static str,
	pub android: &'static str,
}

impl WalletKind {
	pub const ALL: [WalletKind; 13] = [
		WalletKind::MetaMask,
		WalletKind::CoinbaseWallet,
		WalletKind::Rainbow,
		WalletKind::TrustWallet,
		WalletKind::BraveWallet,
		WalletKind::PhantomEvm,
		WalletKind::GenericEvm,
		WalletKind::Phantom,
		WalletKind::Solflare,
		WalletKind::Glow,
		WalletKind::Slope,
		WalletKind::Backpack,
		WalletKind::GenericSolana,
	];

	pub fn family(self) -> NetworkFamily {
		match self {
			WalletKind::MetaMask
			| WalletKind::CoinbaseWallet
			| WalletKind::Rainbow
			| WalletKind::TrustWallet
			| WalletKind::BraveWallet
			| WalletKind::PhantomEvm
			| WalletKind::GenericEvm => NetworkFamily::Evm,
			WalletKind::Phantom
			| WalletKind::Solflare
			| WalletKind::Glow
			| WalletKind::Slope
			| WalletKind::Backpack
			| WalletKind::GenericSolana => NetworkFamily::Solana,
		}
	}

	/// Base of the descriptor id. Stable across page loads, so it is what
	/// gets remembered as the user's preference.
	pub fn id(self) -> &'static str {
		match self {
			WalletKind::MetaMask => "metamask",
			WalletKind::CoinbaseWallet => "coinbase",
			WalletKind::Rainbow => "rainbow",
			WalletKind::TrustWallet => "trust",
			WalletKind::BraveWallet => "brave",
			WalletKind::PhantomEvm => "phantom-evm",
			WalletKind::GenericEvm => "web3-wallet",
			WalletKind::Phantom => "phantom",
			WalletKind::Solflare => "solflare",
			WalletKind::Glow => "glow",
			WalletKind::Slope => "slope",
			WalletKind::Backpack => "backpack",
			WalletKind::GenericSolana => "solana-wallet",
		}
	}

	pub fn from_id(id: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.id() == id)
	}

	pub fn display_name(self) -> &'static str {
		match self {
			WalletKind::MetaMask => "MetaMask",
			WalletKind::CoinbaseWallet => "Coinbase Wallet",
			WalletKind::Rainbow => "Rainbow Wallet",
			WalletKind::TrustWallet => "Trust Wallet",
			WalletKind::BraveWallet => "Brave Wallet",
			WalletKind::PhantomEvm => "Phantom (EVM)",
			WalletKind::GenericEvm => "Web3 Wallet",
			WalletKind::Phantom => "Phantom",
			WalletKind::Solflare => "Solflare",
			WalletKind::Glow => "Glow",
			WalletKind::Slope => "Slope",
			WalletKind::Backpack => "Backpack",
			WalletKind::GenericSolana => "Solana Wallet",
		}
	}

	pub fn icon(self) -> &'static str {
		match self {
			WalletKind::MetaMask => "🦊",
			WalletKind::CoinbaseWallet => "🔵",
			WalletKind::Rainbow => "🌈",
			WalletKind::TrustWallet => "🛡️",
			WalletKind::BraveWallet => "🦁",
			WalletKind::PhantomEvm | WalletKind::Phantom => "👻",
			WalletKind::GenericEvm => "🔗",
			WalletKind::Solflare => "☀️",
			WalletKind::Glow => "✨",
			WalletKind::Slope => "📈",
			WalletKind::Backpack => "🎒",
			WalletKind::GenericSolana => "🟣",
		}
	}

	/// Lower sorts first.
	pub fn priority(self) -> u8 {
		match self {
			WalletKind::MetaMask | WalletKind::Phantom => 1,
			WalletKind::CoinbaseWallet | WalletKind::Solflare => 2,
			WalletKind::Rainbow | WalletKind::Backpack => 3,
			WalletKind::TrustWallet | WalletKind::Slope => 4,
			WalletKind::BraveWallet => 5,
			WalletKind::PhantomEvm | WalletKind::Glow => 6,
			WalletKind::GenericEvm | WalletKind::GenericSolana => 10,
		}
	}

	/// Custom-scheme link that reopens the page inside the wallet's browser.
	/// `{url}` is the percent-encoded page URL, `{host}` the page host.
	pub fn deeplink_template(self) -> Option<&'static str> {
		match self {
			WalletKind::MetaMask => Some("metamask://dapp/{host}"),
			WalletKind::CoinbaseWallet => Some("cbwallet://dapp?url={url}"),
			WalletKind::Rainbow => Some("rainbow://dapp/{host}"),
			WalletKind::TrustWallet => Some("trust://browser_tab_open?url={url}"),
			WalletKind::Phantom => Some("phantom://browse/{url}"),
			WalletKind::Solflare => Some("solflare://v1/browse/{url}"),
			_ => None,
		}
	}

	/// HTTPS link that opens the app when installed and the store otherwise.
	pub fn universal_link_template(self) -> Option<&'static str> {
		match self {
			WalletKind::MetaMask => Some("https://metamask.app.link/dapp/{host}"),
			WalletKind::CoinbaseWallet => Some("https://go.cb-w.com/dapp?cb_url={url}"),
			WalletKind::Rainbow => Some("https://rnbwapp.com/app/{host}"),
			WalletKind::TrustWallet => Some("https://link.trustwallet.com/open_url?coin_id=60&url={url}"),
			WalletKind::Phantom => Some("https://phantom.app/ul/browse/{url}?ref={host}"),
			WalletKind::Solflare => Some("https://solflare.com/ul/v1/browse/{url}"),
			_ => None,
		}
	}

	pub fn store_links(self) -> Option<StoreLinks> {
		let (ios, android) = match self {
			WalletKind::MetaMask => (
				"https://apps.apple.com/app/metamask/id1438144202",
				"https://play.google.com/store/apps/details?id=io.metamask",
			),
			WalletKind::TrustWallet => (
				"https://apps.apple.com/app/trust-crypto-bitcoin-wallet/id1288339409",
				"https://play.google.com/store/apps/details?id=com.wallet.crypto.trustapp",
			),
			WalletKind::CoinbaseWallet => (
				"https://apps.apple.com/app/coinbase-wallet/id1278383455",
				"https://play.google.com/store/apps/details?id=org.toshi",
			),
			WalletKind::Rainbow => (
				"https://apps.apple.com/app/rainbow-ethereum-wallet/id1457119021",
				"https://play.google.com/store/apps/details?id=me.rainbow",
			),
			WalletKind::Phantom => (
				"https://apps.apple.com/app/phantom-solana-wallet/id1598432977",
				"https://play.google.com/store/apps/details?id=app.phantom",
			),
			WalletKind::Solflare => (
				"https://apps.apple.com/app/solflare/id1580902717",
				"https://play.google.com/store/apps/details?id=com.solflare.mobile",
			),
			WalletKind::Backpack => (
				"https://apps.apple.com/app/backpack-crypto-wallet/id6446166309",
				"https://play.google.com/store/apps/details?id=app.backpack.mobile",
			),
			_ => return None,
		};
		Some(StoreLinks { ios, android })
	}

	/// Brave's wallet is desktop-only; it never gets mobile treatment.
	pub fn supports_mobile(self) -> bool {
		!matches!(self, WalletKind::BraveWallet)
	}

	/// Token a wallet's in-app browser puts in its user agent.
	pub fn user_agent_marker(self) -> Option<&'static str> {
		match self {
			WalletKind::MetaMask => Some("metamask"),
			WalletKind::CoinbaseWallet => Some("coinbasewallet"),
			WalletKind::TrustWallet => Some("trust"),
			WalletKind::Rainbow => Some("rainbow"),
			WalletKind::Phantom => Some("phantom"),
			WalletKind::Solflare => Some("solflare"),
			_ => None,
		}
	}

	/// Wallets suggested for installation, best first.
	pub fn recommended(family: NetworkFamily) -> &'static [WalletKind] {
		match family {
			NetworkFamily::Evm => &[WalletKind::MetaMask, WalletKind::CoinbaseWallet, WalletKind::TrustWallet],
			NetworkFamily::Solana => &[WalletKind::Phantom, WalletKind::Solflare, WalletKind::Backpack],
		}
	}
}

impl fmt::Display for WalletKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.display_name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_round_trip() {
		for kind in WalletKind::ALL {
			assert_eq!(WalletKind::from_id(kind.id()), Some(kind));
		}
		assert_eq!(WalletKind::from_id("nope"), None);
	}

	#[test]
	fn families_partition_kinds() {
		let evm = WalletKind::ALL.iter().filter(|k| k.family() == NetworkFamily::Evm).count();
		assert_eq!(evm, 7);
		for family in NetworkFamily::ALL {
			assert!(WalletKind::recommended(family).iter().all(|k| k.family() == family));
		}
	}

	#[test]
	fn generic_kinds_sort_last() {
		assert!(WalletKind::GenericEvm.priority() > WalletKind::BraveWallet.priority());
		assert!(WalletKind::GenericSolana.priority() > WalletKind::Glow.priority());
	}

	#[test]
	fn deep_link_and_store_tables() {
		assert_eq!(WalletKind::Phantom.deeplink_template(), Some("phantom://browse/{url}"));
		assert!(WalletKind::BraveWallet.deeplink_template().is_none());
		assert!(!WalletKind::BraveWallet.supports_mobile());
		assert!(WalletKind::Solflare.store_links().unwrap().android.contains("com.solflare.mobile"));
	}
}
