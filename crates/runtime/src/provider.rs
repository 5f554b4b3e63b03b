//! Provider traits and the handle type the registry hands out.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;
use ww_protocol::{ConnectOptions, NetworkFamily, ProviderEvent, RequestArguments};

use crate::error::{Error, Result};

/// Boolean properties probed on EVM provider objects.
///
/// `selectedProvider.isCoinbaseWallet` is a nested property; hosts read it
/// off `provider.selectedProvider` and report it under this dotted name.
pub const EVM_FLAGS: &[&str] = &[
	"isMetaMask",
	"isCoinbaseWallet",
	"selectedProvider.isCoinbaseWallet",
	"isRainbow",
	"isTrust",
	"isBraveWallet",
	"isPhantom",
];

/// Boolean properties probed on Solana adapter objects.
pub const SOLANA_FLAGS: &[&str] = &["isPhantom", "isSolflare", "isGlow", "isSlope", "isBackpack"];

/// Stream of provider events for one subscription.
pub type ProviderEvents = UnboundedReceiver<ProviderEvent>;

/// The set of truthy identity flags found on an injected object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderFlags(BTreeSet<String>);

impl ProviderFlags {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, flag: impl Into<String>) -> Self {
		self.0.insert(flag.into());
		self
	}

	pub fn insert(&mut self, flag: impl Into<String>) {
		self.0.insert(flag.into());
	}

	pub fn has(&self, flag: &str) -> bool {
		self.0.contains(flag)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}

impl<S: Into<String>> FromIterator<S> for ProviderFlags {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

/// An EIP-1193 provider (`window.ethereum` or one entry of `providers`).
#[async_trait(?Send)]
pub trait Eip1193Provider {
	/// `provider.request(args)`. May suspend indefinitely while the wallet
	/// popup is open.
	async fn request(&self, args: RequestArguments) -> Result<Value>;

	/// Subscribes to `accountsChanged`, `chainChanged` and `disconnect`.
	/// Providers without an `on` method return `None`.
	fn subscribe(&self) -> Option<ProviderEvents> {
		None
	}
}

/// A Solana wallet adapter (`window.solana`, `window.phantom.solana`, ...).
#[async_trait(?Send)]
pub trait SolanaProvider {
	/// `adapter.connect(options?)`. The resolved value is returned raw; its
	/// shape varies by wallet.
	async fn connect(&self, options: Option<ConnectOptions>) -> Result<Value>;

	async fn disconnect(&self) -> Result<()>;

	/// Whether the adapter also exposes a generic `request()` method.
	fn supports_request(&self) -> bool {
		false
	}

	async fn request(&self, args: RequestArguments) -> Result<Value> {
		Err(Error::Unsupported(format!("request({})", args.method)))
	}

	/// String form of `adapter.publicKey`, if set.
	fn public_key(&self) -> Option<String>;

	/// Subscribes to `accountChanged` / `disconnect`, mapped to [`ProviderEvent`].
	fn subscribe(&self) -> Option<ProviderEvents> {
		None
	}
}

/// Shared reference to an injected provider object.
///
/// Cloning shares the same underlying object; the registry never owns or
/// tears down what the page injected.
#[derive(Clone)]
pub enum ProviderHandle {
	Evm(Rc<dyn Eip1193Provider>),
	Solana(Rc<dyn SolanaProvider>),
}

impl ProviderHandle {
	pub fn family(&self) -> NetworkFamily {
		match self {
			ProviderHandle::Evm(_) => NetworkFamily::Evm,
			ProviderHandle::Solana(_) => NetworkFamily::Solana,
		}
	}

	pub fn as_evm(&self) -> Option<&Rc<dyn Eip1193Provider>> {
		match self {
			ProviderHandle::Evm(p) => Some(p),
			ProviderHandle::Solana(_) => None,
		}
	}

	pub fn as_solana(&self) -> Option<&Rc<dyn SolanaProvider>> {
		match self {
			ProviderHandle::Solana(p) => Some(p),
			ProviderHandle::Evm(_) => None,
		}
	}

	/// Identity comparison: do both handles point at the same injected object?
	pub fn same_object(&self, other: &ProviderHandle) -> bool {
		std::ptr::addr_eq(self.addr(), other.addr())
	}

	pub fn subscribe(&self) -> Option<ProviderEvents> {
		match self {
			ProviderHandle::Evm(p) => p.subscribe(),
			ProviderHandle::Solana(p) => p.subscribe(),
		}
	}

	fn addr(&self) -> *const () {
		match self {
			ProviderHandle::Evm(p) => Rc::as_ptr(p) as *const (),
			ProviderHandle::Solana(p) => Rc::as_ptr(p) as *const (),
		}
	}
}

impl fmt::Debug for ProviderHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ProviderHandle::{}({:p})", self.family(), self.addr())
	}
}
