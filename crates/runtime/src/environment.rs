//! The page as the connection core sees it.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::provider::{Eip1193Provider, ProviderFlags, SolanaProvider};

/// An injected object together with the identity flags it exposes.
pub struct InjectedObject<P: ?Sized> {
	pub flags: ProviderFlags,
	pub handle: Rc<P>,
}

impl<P: ?Sized> InjectedObject<P> {
	pub fn new(flags: ProviderFlags, handle: Rc<P>) -> Self {
		Self { flags, handle }
	}
}

impl<P: ?Sized> Clone for InjectedObject<P> {
	fn clone(&self) -> Self {
		Self {
			flags: self.flags.clone(),
			handle: Rc::clone(&self.handle),
		}
	}
}

impl<P: ?Sized> fmt::Debug for InjectedObject<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InjectedObject")
			.field("flags", &self.flags)
			.field("handle", &Rc::as_ptr(&self.handle).cast::<()>())
			.finish()
	}
}

pub type EvmObject = InjectedObject<dyn Eip1193Provider>;
pub type SolanaObject = InjectedObject<dyn SolanaProvider>;

/// `window.ethereum`, plus its `providers` array when several extensions
/// inject at once.
#[derive(Debug, Clone)]
pub struct InjectedEthereum {
	pub root: EvmObject,
	pub providers: Option<Vec<EvmObject>>,
}

/// Where Solana adapters are injected, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolanaNamespace {
	/// `window.solana`
	Solana,
	/// `window.phantom.solana`
	Phantom,
	/// `window.solflare`
	Solflare,
	/// `window.glow`
	Glow,
	/// `window.slope`
	Slope,
	/// `window.backpack`
	Backpack,
}

impl SolanaNamespace {
	pub const ALL: [SolanaNamespace; 6] = [
		SolanaNamespace::Solana,
		SolanaNamespace::Phantom,
		SolanaNamespace::Solflare,
		SolanaNamespace::Glow,
		SolanaNamespace::Slope,
		SolanaNamespace::Backpack,
	];

	/// Property path under `window`.
	pub fn path(self) -> &'static [&'static str] {
		match self {
			SolanaNamespace::Solana => &["solana"],
			SolanaNamespace::Phantom => &["phantom", "solana"],
			SolanaNamespace::Solflare => &["solflare"],
			SolanaNamespace::Glow => &["glow"],
			SolanaNamespace::Slope => &["slope"],
			SolanaNamespace::Backpack => &["backpack"],
		}
	}
}

impl fmt::Display for SolanaNamespace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "window.{}", self.path().join("."))
	}
}

/// Read-only view of the hosting page.
pub trait Environment {
	/// `true` while the page has asked wallets not to be touched
	/// (`WALLET_AUTO_CONNECTION_BLOCKED`).
	fn auto_connect_blocked(&self) -> bool;

	fn user_agent(&self) -> String;

	/// `location.href`, when known.
	fn page_url(&self) -> Option<String>;

	fn ethereum(&self) -> Option<InjectedEthereum>;

	fn solana(&self, namespace: SolanaNamespace) -> Option<SolanaObject>;
}

/// Opens a URL outside the page (deep links into wallet apps).
pub trait Launcher {
	fn open(&self, url: &str) -> Result<()>;
}
