//! In-memory page with scripted wallets.
//!
//! Built from an [`EnvironmentFixture`] (usually loaded from JSON). Every
//! injected object is a real [`Rc`] so that identity-based deduplication
//! behaves the way it does against `window`: an alias namespace hands out
//! the very same object as its target.

mod evm;
mod fixture;
mod solana;


use std::collections::BTreeMap;
use std::rc::Rc;

use parking_lot::Mutex;

pub use self::evm::ScriptedEvmProvider;
pub use self::fixture::{
	DEFAULT_PAGE_URL, DESKTOP_USER_AGENT, EnvironmentFixture, EthereumFixture, EvmWalletFixture,
	SolanaSlot, SolanaWalletFixture,
};
pub use self::solana::ScriptedSolanaProvider;
use crate::environment::{
	Environment, EvmObject, InjectedEthereum, InjectedObject, Launcher, SolanaNamespace, SolanaObject,
};
use crate::error::{Error, Result};
use crate::provider::{Eip1193Provider, ProviderFlags, SolanaProvider};

struct ScriptedEthereum {
	root: Rc<ScriptedEvmProvider>,
	providers: Option<Vec<Rc<ScriptedEvmProvider>>>,
}

/// [`Environment`] over scripted wallets.
pub struct ScriptedEnvironment {
	user_agent: String,
	page_url: Option<String>,
	blocked: Mutex<bool>,
	ethereum: Mutex<Option<ScriptedEthereum>>,
	solana: Mutex<BTreeMap<SolanaNamespace, Rc<ScriptedSolanaProvider>>>,
}

impl ScriptedEnvironment {
	pub fn new(fixture: EnvironmentFixture) -> Self {
		let env = Self {
			user_agent: fixture.user_agent,
			page_url: fixture.page_url,
			blocked: Mutex::new(fixture.auto_connect_blocked),
			ethereum: Mutex::new(None),
			solana: Mutex::new(BTreeMap::new()),
		};
		if let Some(eth) = fixture.ethereum {
			env.inject_ethereum(eth);
		}
		env.inject_solana_slots(fixture.solana);
		env
	}

	pub fn from_json(json: &str) -> Result<Self> {
		let fixture: EnvironmentFixture = serde_json::from_str(json)?;
		Ok(Self::new(fixture))
	}

	/// Replaces `window.ethereum`, as an extension injecting late would.
	pub fn inject_ethereum(&self, fixture: EthereumFixture) {
		let root = Rc::new(ScriptedEvmProvider::new(fixture.root));
		let providers = fixture
			.providers
			.map(|list| list.into_iter().map(|p| Rc::new(ScriptedEvmProvider::new(p))).collect());
		*self.ethereum.lock() = Some(ScriptedEthereum { root, providers });
	}

	pub fn inject_solana(&self, namespace: SolanaNamespace, fixture: SolanaWalletFixture) -> Rc<ScriptedSolanaProvider> {
		let provider = Rc::new(ScriptedSolanaProvider::new(fixture));
		self.solana.lock().insert(namespace, Rc::clone(&provider));
		provider
	}

	fn inject_solana_slots(&self, slots: BTreeMap<SolanaNamespace, SolanaSlot>) {
		let mut aliases = Vec::new();
		for (namespace, slot) in slots {
			match slot {
				SolanaSlot::Wallet(wallet) => {
					self.inject_solana(namespace, wallet);
				}
				SolanaSlot::Alias { alias } => aliases.push((namespace, alias)),
			}
		}

		let mut solana = self.solana.lock();
		for (namespace, target) in aliases {
			match solana.get(&target).cloned() {
				Some(provider) => {
					solana.insert(namespace, provider);
				}
				None => tracing::warn!(
					target = "ww.scripted",
					%namespace,
					%target,
					"alias points at an empty namespace; ignoring"
				),
			}
		}
	}

	pub fn set_auto_connect_blocked(&self, blocked: bool) {
		*self.blocked.lock() = blocked;
	}

	pub fn evm_root(&self) -> Option<Rc<ScriptedEvmProvider>> {
		self.ethereum.lock().as_ref().map(|eth| Rc::clone(&eth.root))
	}

	/// Entry `index` of `window.ethereum.providers`.
	pub fn evm_provider(&self, index: usize) -> Option<Rc<ScriptedEvmProvider>> {
		self.ethereum
			.lock()
			.as_ref()
			.and_then(|eth| eth.providers.as_ref())
			.and_then(|list| list.get(index).cloned())
	}

	pub fn solana_provider(&self, namespace: SolanaNamespace) -> Option<Rc<ScriptedSolanaProvider>> {
		self.solana.lock().get(&namespace).cloned()
	}
}

fn evm_object(provider: &Rc<ScriptedEvmProvider>) -> EvmObject {
	let flags: ProviderFlags = provider.flags().iter().cloned().collect();
	let handle: Rc<dyn Eip1193Provider> = provider.clone();
	InjectedObject::new(flags, handle)
}

impl Environment for ScriptedEnvironment {
	fn auto_connect_blocked(&self) -> bool {
		*self.blocked.lock()
	}

	fn user_agent(&self) -> String {
		self.user_agent.clone()
	}

	fn page_url(&self) -> Option<String> {
		self.page_url.clone()
	}

	fn ethereum(&self) -> Option<InjectedEthereum> {
		let eth = self.ethereum.lock();
		let eth = eth.as_ref()?;
		Some(InjectedEthereum {
			root: evm_object(&eth.root),
			providers: eth
				.providers
				.as_ref()
				.map(|list| list.iter().map(evm_object).collect()),
		})
	}

	fn solana(&self, namespace: SolanaNamespace) -> Option<SolanaObject> {
		let provider = self.solana.lock().get(&namespace).cloned()?;
		let flags: ProviderFlags = provider.flags().iter().cloned().collect();
		let handle: Rc<dyn SolanaProvider> = provider;
		Some(InjectedObject::new(flags, handle))
	}
}

/// [`Launcher`] that records URLs instead of leaving the page.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
	opened: Mutex<Vec<String>>,
	fail: bool,
}

impl RecordingLauncher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Launcher whose `open` always fails.
	pub fn failing() -> Self {
		Self {
			opened: Mutex::new(Vec::new()),
			fail: true,
		}
	}

	pub fn opened(&self) -> Vec<String> {
		self.opened.lock().clone()
	}
}

impl Launcher for RecordingLauncher {
	fn open(&self, url: &str) -> Result<()> {
		if self.fail {
			return Err(Error::Unavailable(format!("cannot open {url}")));
		}
		self.opened.lock().push(url.to_string());
		Ok(())
	}
}
