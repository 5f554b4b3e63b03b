//! Provider enumeration and classification.
//!
//! [`ProviderRegistry::enumerate`] walks the injection points for one
//! network family and returns a fresh list of [`ProviderDescriptor`]s each
//! time it is called. Nothing is cached: wallets inject late, and the deep
//! link bridge relies on re-enumeration to notice them.

use std::rc::Rc;

use serde::Serialize;
use ww_protocol::NetworkFamily;
use ww_runtime::{Environment, EvmObject, ProviderFlags, ProviderHandle, SolanaNamespace};

use crate::device::DeviceProfile;
use crate::wallet::WalletKind;

/// What a provider can do beyond the family protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
	pub supports_mobile_deeplink: bool,
	/// Template with `{url}` / `{host}` placeholders; set only on mobile.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deeplink_template: Option<&'static str>,
}

/// One detected wallet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
	/// Unique within one enumeration; stable across page loads for the same
	/// set of wallets.
	pub id: String,
	pub display_name: String,
	pub icon: &'static str,
	pub kind: WalletKind,
	pub family: NetworkFamily,
	/// Whether this provider gets mobile treatment (phone UA and not a
	/// desktop-only wallet).
	pub mobile: bool,
	pub capabilities: Capabilities,
	#[serde(skip)]
	pub handle: ProviderHandle,
}

impl ProviderDescriptor {
	fn new(kind: WalletKind, handle: ProviderHandle, device: &DeviceProfile) -> Self {
		let mobile = device.mobile && kind.supports_mobile();
		let deeplink_template = if mobile { kind.deeplink_template() } else { None };
		Self {
			id: kind.id().to_string(),
			display_name: kind.display_name().to_string(),
			icon: kind.icon(),
			kind,
			family: kind.family(),
			mobile,
			capabilities: Capabilities {
				supports_mobile_deeplink: deeplink_template.is_some(),
				deeplink_template,
			},
			handle,
		}
	}
}

/// Classifies an EVM provider object by its identity flags.
///
/// Brave and Phantom both set `isMetaMask` for compatibility, so those flags
/// veto the MetaMask match.
pub fn classify_evm(flags: &ProviderFlags) -> WalletKind {
	if flags.has("isMetaMask") && !flags.has("isPhantom") && !flags.has("isBraveWallet") {
		WalletKind::MetaMask
	} else if flags.has("isCoinbaseWallet") || flags.has("selectedProvider.isCoinbaseWallet") {
		WalletKind::CoinbaseWallet
	} else if flags.has("isRainbow") {
		WalletKind::Rainbow
	} else if flags.has("isTrust") {
		WalletKind::TrustWallet
	} else if flags.has("isBraveWallet") {
		WalletKind::BraveWallet
	} else if flags.has("isPhantom") {
		WalletKind::PhantomEvm
	} else {
		WalletKind::GenericEvm
	}
}

/// Classifies whatever sits at `window.solana` when no dedicated namespace
/// claimed it.
fn classify_generic_solana(flags: &ProviderFlags) -> WalletKind {
	if flags.has("isSolflare") {
		WalletKind::Solflare
	} else if flags.has("isGlow") {
		WalletKind::Glow
	} else if flags.has("isBackpack") {
		WalletKind::Backpack
	} else {
		WalletKind::GenericSolana
	}
}

pub struct ProviderRegistry {
	env: Rc<dyn Environment>,
}

impl ProviderRegistry {
	pub fn new(env: Rc<dyn Environment>) -> Self {
		Self { env }
	}

	pub fn environment(&self) -> &Rc<dyn Environment> {
		&self.env
	}

	pub fn device(&self) -> DeviceProfile {
		DeviceProfile::detect(&self.env.user_agent())
	}

	pub fn page_url(&self) -> Option<String> {
		self.env.page_url()
	}

	/// Lists the wallets currently injected for `family`, best first.
	///
	/// Returns an empty list while auto-connection is blocked, without
	/// touching any provider object.
	pub fn enumerate(&self, family: NetworkFamily) -> Vec<ProviderDescriptor> {
		if self.env.auto_connect_blocked() {
			tracing::debug!(target = "ww.registry", %family, "auto-connection blocked; skipping detection");
			return Vec::new();
		}

		let device = self.device();
		let mut found = match family {
			NetworkFamily::Evm => self.evm_candidates(),
			NetworkFamily::Solana => self.solana_candidates(),
		};
		if family == NetworkFamily::Evm {
			found.sort_by_key(|(kind, _)| kind.priority());
		}

		let descriptors = assign_ids(
			found
				.into_iter()
				.map(|(kind, handle)| ProviderDescriptor::new(kind, handle, &device))
				.collect(),
		);

		tracing::debug!(
			target = "ww.registry",
			%family,
			count = descriptors.len(),
			mobile = device.mobile,
			ids = ?descriptors.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
			"enumerated providers"
		);
		descriptors
	}

	fn evm_candidates(&self) -> Vec<(WalletKind, ProviderHandle)> {
		let Some(ethereum) = self.env.ethereum() else {
			return Vec::new();
		};

		let objects: Vec<EvmObject> = match ethereum.providers {
			Some(list) if !list.is_empty() => list,
			_ => vec![ethereum.root],
		};

		let mut found = Vec::new();
		for object in objects {
			push_unique(
				&mut found,
				classify_evm(&object.flags),
				ProviderHandle::Evm(object.handle),
			);
		}
		found
	}

	fn solana_candidates(&self) -> Vec<(WalletKind, ProviderHandle)> {
		let env = &self.env;
		let mut found = Vec::new();
		let mut probe = |namespace: SolanaNamespace, accept: &dyn Fn(&ProviderFlags) -> Option<WalletKind>| {
			let Some(object) = env.solana(namespace) else {
				return;
			};
			if let Some(kind) = accept(&object.flags) {
				push_unique(&mut found, kind, ProviderHandle::Solana(object.handle));
			}
		};

		let phantom_flag = |flags: &ProviderFlags| flags.has("isPhantom").then_some(WalletKind::Phantom);
		probe(SolanaNamespace::Solana, &phantom_flag);
		probe(SolanaNamespace::Phantom, &phantom_flag);
		probe(SolanaNamespace::Solflare, &|_| Some(WalletKind::Solflare));
		probe(SolanaNamespace::Glow, &|_| Some(WalletKind::Glow));
		probe(SolanaNamespace::Slope, &|_| Some(WalletKind::Slope));
		probe(SolanaNamespace::Solana, &|flags| flags.has("isSlope").then_some(WalletKind::Slope));
		probe(SolanaNamespace::Backpack, &|_| Some(WalletKind::Backpack));
		probe(SolanaNamespace::Solana, &|flags| Some(classify_generic_solana(flags)));
		found
	}
}

fn push_unique(found: &mut Vec<(WalletKind, ProviderHandle)>, kind: WalletKind, handle: ProviderHandle) {
	if found.iter().any(|(_, existing)| existing.same_object(&handle)) {
		tracing::trace!(target = "ww.registry", %kind, "handle already listed; skipping");
		return;
	}
	found.push((kind, handle));
}

/// Suffixes repeated ids (`metamask`, `metamask-2`) and numbers repeated
/// display names the same way.
fn assign_ids(mut descriptors: Vec<ProviderDescriptor>) -> Vec<ProviderDescriptor> {
	for i in 0..descriptors.len() {
		let kind = descriptors[i].kind;
		let seen = descriptors[..i].iter().filter(|d| d.kind == kind).count();
		if seen > 0 {
			let n = seen + 1;
			descriptors[i].id = format!("{}-{n}", kind.id());
			descriptors[i].display_name = format!("{} {n}", kind.display_name());
		}
	}
	descriptors
}

#[cfg(test)]
mod tests {
	use ww_runtime::scripted::{EnvironmentFixture, EvmWalletFixture, ScriptedEnvironment, SolanaWalletFixture};

	use super::*;

	const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

	fn registry(fixture: EnvironmentFixture) -> (ProviderRegistry, Rc<ScriptedEnvironment>) {
		let env = Rc::new(ScriptedEnvironment::new(fixture));
		(ProviderRegistry::new(env.clone()), env)
	}

	fn ids(list: &[ProviderDescriptor]) -> Vec<&str> {
		list.iter().map(|d| d.id.as_str()).collect()
	}

	#[test]
	fn blocked_environment_yields_nothing() {
		let (registry, env) = registry(
			EnvironmentFixture::default()
				.with_ethereum(EvmWalletFixture::new(&["isMetaMask"]))
				.with_solana(SolanaNamespace::Solana, SolanaWalletFixture::new(&["isPhantom"], "K"))
				.blocked(),
		);
		assert!(registry.enumerate(NetworkFamily::Evm).is_empty());
		assert!(registry.enumerate(NetworkFamily::Solana).is_empty());

		env.set_auto_connect_blocked(false);
		assert_eq!(registry.enumerate(NetworkFamily::Evm).len(), 1);
	}

	#[test]
	fn no_injection_is_empty_not_error() {
		let (registry, _) = registry(EnvironmentFixture::default());
		assert!(registry.enumerate(NetworkFamily::Evm).is_empty());
		assert!(registry.enumerate(NetworkFamily::Solana).is_empty());
	}

	#[test]
	fn classify_evm_priority() {
		let flags = |list: &[&str]| list.iter().copied().collect::<ProviderFlags>();
		assert_eq!(classify_evm(&flags(&["isMetaMask"])), WalletKind::MetaMask);
		assert_eq!(classify_evm(&flags(&["isMetaMask", "isPhantom"])), WalletKind::PhantomEvm);
		assert_eq!(classify_evm(&flags(&["isMetaMask", "isBraveWallet"])), WalletKind::BraveWallet);
		assert_eq!(
			classify_evm(&flags(&["selectedProvider.isCoinbaseWallet"])),
			WalletKind::CoinbaseWallet
		);
		assert_eq!(classify_evm(&flags(&["isTrust", "isRainbow"])), WalletKind::Rainbow);
		assert_eq!(classify_evm(&flags(&[])), WalletKind::GenericEvm);
	}

	#[test]
	fn providers_array_is_classified_and_sorted() {
		let (registry, _) = registry(EnvironmentFixture::default().with_evm_providers(vec![
			EvmWalletFixture::new(&[]),
			EvmWalletFixture::new(&["isCoinbaseWallet"]),
			EvmWalletFixture::new(&["isMetaMask"]),
			EvmWalletFixture::new(&[]),
		]));

		let list = registry.enumerate(NetworkFamily::Evm);
		assert_eq!(ids(&list), vec!["metamask", "coinbase", "web3-wallet", "web3-wallet-2"]);
		assert_eq!(list[3].display_name, "Web3 Wallet 2");
		assert!(list.iter().all(|d| d.family == NetworkFamily::Evm));
	}

	#[test]
	fn unknown_root_is_kept_as_generic() {
		let (registry, _) = registry(EnvironmentFixture::default().with_ethereum(EvmWalletFixture::new(&["isFrame"])));
		let list = registry.enumerate(NetworkFamily::Evm);
		assert_eq!(ids(&list), vec!["web3-wallet"]);
		assert_eq!(list[0].display_name, "Web3 Wallet");
	}

	#[test]
	fn solana_aliases_are_listed_once() {
		let (registry, _) = registry(
			EnvironmentFixture::default()
				.with_solana(SolanaNamespace::Solana, SolanaWalletFixture::new(&["isPhantom"], "P"))
				.with_solana_alias(SolanaNamespace::Phantom, SolanaNamespace::Solana)
				.with_solana(SolanaNamespace::Solflare, SolanaWalletFixture::new(&["isSolflare"], "S"))
				.with_solana(SolanaNamespace::Backpack, SolanaWalletFixture::new(&["isBackpack"], "B")),
		);
		let list = registry.enumerate(NetworkFamily::Solana);
		assert_eq!(ids(&list), vec!["phantom", "solflare", "backpack"]);
	}

	#[test]
	fn solana_generic_fallback() {
		let (registry, _) = registry(
			EnvironmentFixture::default()
				.with_solana(SolanaNamespace::Solana, SolanaWalletFixture::new(&[], "G"))
				.with_solana(SolanaNamespace::Glow, SolanaWalletFixture::new(&["isGlow"], "Glow")),
		);
		let list = registry.enumerate(NetworkFamily::Solana);
		assert_eq!(ids(&list), vec!["glow", "solana-wallet"]);
	}

	#[test]
	fn slope_flag_on_window_solana() {
		let (registry, _) = registry(
			EnvironmentFixture::default().with_solana(SolanaNamespace::Solana, SolanaWalletFixture::new(&["isSlope"], "S")),
		);
		assert_eq!(ids(&registry.enumerate(NetworkFamily::Solana)), vec!["slope"]);
	}

	#[test]
	fn mobile_descriptors_carry_deeplink_template() {
		let (registry, _) = registry(
			EnvironmentFixture::default()
				.with_user_agent(IPHONE)
				.with_evm_providers(vec![
					EvmWalletFixture::new(&["isMetaMask"]),
					EvmWalletFixture::new(&["isBraveWallet"]),
				]),
		);
		let list = registry.enumerate(NetworkFamily::Evm);
		assert!(list[0].mobile);
		assert_eq!(list[0].capabilities.deeplink_template, Some("metamask://dapp/{host}"));
		assert!(list[0].capabilities.supports_mobile_deeplink);

		assert_eq!(list[1].kind, WalletKind::BraveWallet);
		assert!(!list[1].mobile);
		assert!(!list[1].capabilities.supports_mobile_deeplink);
	}

	#[test]
	fn desktop_descriptors_have_no_deeplink() {
		let (registry, _) = registry(
			EnvironmentFixture::default().with_solana(SolanaNamespace::Solana, SolanaWalletFixture::new(&["isPhantom"], "P")),
		);
		let list = registry.enumerate(NetworkFamily::Solana);
		assert!(!list[0].mobile);
		assert_eq!(list[0].capabilities.deeplink_template, None);
	}
}
