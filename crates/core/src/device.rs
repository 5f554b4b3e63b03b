//! User-agent sniffing: mobile detection and wallet in-app browsers.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::wallet::WalletKind;

static MOBILE_UA: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini").expect("valid mobile UA pattern")
});

static IOS_UA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)iPhone|iPad|iPod").expect("valid iOS UA pattern"));

/// Wallet browsers in the order they are checked. Trust's token is short
/// and generic, so more specific markers go first.
const WALLET_BROWSERS: [WalletKind; 6] = [
	WalletKind::MetaMask,
	WalletKind::CoinbaseWallet,
	WalletKind::Phantom,
	WalletKind::Solflare,
	WalletKind::Rainbow,
	WalletKind::TrustWallet,
];

/// What the user agent says about the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
	pub mobile: bool,
	pub ios: bool,
	pub android: bool,
	/// Set when the page is running inside a wallet app's built-in browser.
	pub wallet_browser: Option<WalletKind>,
}

impl DeviceProfile {
	pub fn detect(user_agent: &str) -> Self {
		let lowered = user_agent.to_ascii_lowercase();
		let wallet_browser = WALLET_BROWSERS.into_iter().find(|kind| {
			kind.user_agent_marker()
				.is_some_and(|marker| lowered.contains(marker))
		});

		Self {
			mobile: MOBILE_UA.is_match(user_agent),
			ios: IOS_UA.is_match(user_agent),
			android: lowered.contains("android"),
			wallet_browser,
		}
	}

	/// Store listing for this platform.
	pub fn store_link(&self, kind: WalletKind) -> Option<&'static str> {
		let links = kind.store_links()?;
		if self.ios {
			Some(links.ios)
		} else if self.android {
			Some(links.android)
		} else {
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148";
	const ANDROID_METAMASK: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Mobile Safari/537.36 MetaMaskMobile/7.24";
	const DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

	#[test]
	fn desktop_is_not_mobile() {
		let device = DeviceProfile::detect(DESKTOP);
		assert_eq!(device, DeviceProfile::default());
		assert_eq!(device.store_link(WalletKind::Phantom), None);
	}

	#[test]
	fn iphone_safari() {
		let device = DeviceProfile::detect(IPHONE);
		assert!(device.mobile && device.ios && !device.android);
		assert_eq!(device.wallet_browser, None);
		assert_eq!(
			device.store_link(WalletKind::Phantom),
			Some("https://apps.apple.com/app/phantom-solana-wallet/id1598432977")
		);
	}

	#[test]
	fn detects_wallet_in_app_browser() {
		let device = DeviceProfile::detect(ANDROID_METAMASK);
		assert!(device.mobile && device.android);
		assert_eq!(device.wallet_browser, Some(WalletKind::MetaMask));

		let phantom = DeviceProfile::detect(&format!("{IPHONE} Phantom/ios"));
		assert_eq!(phantom.wallet_browser, Some(WalletKind::Phantom));
	}

	#[test]
	fn mobile_match_is_case_insensitive() {
		assert!(DeviceProfile::detect("opera mini/8.0").mobile);
	}
}
