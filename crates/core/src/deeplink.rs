//! Rendering wallet deep links, universal links and install guidance.

use serde::Serialize;
use url::Url;

use crate::device::DeviceProfile;
use crate::wallet::WalletKind;

/// Fills `{url}` (percent-encoded page URL) and `{host}` in a link template.
///
/// Returns `None` when the page URL does not parse or has no host, since
/// every template needs at least one of them.
pub fn render(template: &str, page_url: &str) -> Option<String> {
	let parsed = Url::parse(page_url).ok()?;
	let host = parsed.host_str()?;
	Some(
		template
			.replace("{url}", &urlencoding::encode(parsed.as_str()))
			.replace("{host}", host),
	)
}

/// Everything a host needs to send the user to a wallet app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletLinks {
	pub wallet: WalletKind,
	pub name: &'static str,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deep_link: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub universal_link: Option<String>,
	/// Store page for the current platform, if it is a phone.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub store_link: Option<&'static str>,
}

impl WalletLinks {
	pub fn new(kind: WalletKind, page_url: Option<&str>, device: &DeviceProfile) -> Self {
		let fill = |template: Option<&'static str>| template.zip(page_url).and_then(|(t, url)| render(t, url));
		Self {
			wallet: kind,
			name: kind.display_name(),
			deep_link: fill(kind.deeplink_template()),
			universal_link: fill(kind.universal_link_template()),
			store_link: device.store_link(kind),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const PAGE: &str = "https://wildwest.example/launch?token=abc";

	#[test]
	fn renders_url_and_host() {
		assert_eq!(
			render("phantom://browse/{url}", PAGE).unwrap(),
			"phantom://browse/https%3A%2F%2Fwildwest.example%2Flaunch%3Ftoken%3Dabc"
		);
		assert_eq!(
			render("metamask://dapp/{host}", PAGE).unwrap(),
			"metamask://dapp/wildwest.example"
		);
		assert_eq!(
			render("https://phantom.app/ul/browse/{url}?ref={host}", "https://wildwest.example/").unwrap(),
			"https://phantom.app/ul/browse/https%3A%2F%2Fwildwest.example%2F?ref=wildwest.example"
		);
	}

	#[test]
	fn unparseable_page_url_renders_nothing() {
		assert_eq!(render("phantom://browse/{url}", "not a url"), None);
	}

	#[test]
	fn links_for_android_user() {
		let device = DeviceProfile {
			mobile: true,
			android: true,
			..Default::default()
		};
		let links = WalletLinks::new(WalletKind::Solflare, Some(PAGE), &device);
		assert!(links.deep_link.unwrap().starts_with("solflare://v1/browse/https%3A"));
		assert!(links.universal_link.unwrap().starts_with("https://solflare.com/ul/v1/browse/"));
		assert_eq!(
			links.store_link,
			Some("https://play.google.com/store/apps/details?id=com.solflare.mobile")
		);

		let brave = WalletLinks::new(WalletKind::BraveWallet, Some(PAGE), &device);
		assert_eq!(brave.deep_link, None);
		assert_eq!(brave.store_link, None);
	}
}
