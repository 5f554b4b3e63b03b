use std::rc::Rc;

use tokio::sync::broadcast;
use ww_runtime::{Environment, KeyValueStore, Launcher, MemoryStore, Timer};

use super::{EVENT_CAPACITY, State, WalletService};
use crate::bridge::DeepLinkBridge;
use crate::chain_switch::{ChainSwitchProtocol, EndpointResolver, StaticEndpoints};
use crate::config::WalletConfig;
use crate::negotiator::ConnectionNegotiator;
use crate::notify::{Notifier, TracingNotifier};
use crate::preferences::PreferenceStore;
use crate::prompt::{ScriptedPrompt, SelectionPrompt};
use crate::registry::ProviderRegistry;
use crate::selector::WalletSelector;

/// Composition root for [`WalletService`].
///
/// Only the environment and the clock are required. Unset collaborators
/// default to an in-memory store, a prompt that dismisses everything, log
/// notifications, the config's endpoint overrides, and no deep-link
/// launcher.
pub struct WalletServiceBuilder {
	env: Rc<dyn Environment>,
	timer: Rc<dyn Timer>,
	store: Option<Rc<dyn KeyValueStore>>,
	prompt: Option<Rc<dyn SelectionPrompt>>,
	notifier: Option<Rc<dyn Notifier>>,
	resolver: Option<Rc<dyn EndpointResolver>>,
	launcher: Option<Rc<dyn Launcher>>,
	config: WalletConfig,
}

impl WalletServiceBuilder {
	pub fn new(env: Rc<dyn Environment>, timer: Rc<dyn Timer>) -> Self {
		Self {
			env,
			timer,
			store: None,
			prompt: None,
			notifier: None,
			resolver: None,
			launcher: None,
			config: WalletConfig::default(),
		}
	}

	pub fn store(mut self, store: Rc<dyn KeyValueStore>) -> Self {
		self.store = Some(store);
		self
	}

	pub fn prompt(mut self, prompt: Rc<dyn SelectionPrompt>) -> Self {
		self.prompt = Some(prompt);
		self
	}

	pub fn notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
		self.notifier = Some(notifier);
		self
	}

	pub fn endpoint_resolver(mut self, resolver: Rc<dyn EndpointResolver>) -> Self {
		self.resolver = Some(resolver);
		self
	}

	pub fn launcher(mut self, launcher: Rc<dyn Launcher>) -> Self {
		self.launcher = Some(launcher);
		self
	}

	pub fn config(mut self, config: WalletConfig) -> Self {
		self.config = config;
		self
	}

	pub fn build(self) -> WalletService {
		let config = self.config;
		let store = self.store.unwrap_or_else(|| Rc::new(MemoryStore::new()));
		let preferences = PreferenceStore::new(store);
		let prompt = self.prompt.unwrap_or_else(|| Rc::new(ScriptedPrompt::dismissing()));
		let resolver = self
			.resolver
			.unwrap_or_else(|| Rc::new(StaticEndpoints::new(config.endpoints.clone())));

		let chain_switch = ChainSwitchProtocol::new(config.target_chain.clone(), resolver);
		let negotiator = ConnectionNegotiator::new(chain_switch, self.timer.clone())
			.with_fresh_approval(config.force_fresh_approval, config.fresh_settle());
		let bridge = self
			.launcher
			.map(|launcher| DeepLinkBridge::new(launcher, self.timer, config.deep_link.clone()));

		let remembered_family = preferences.marker();
		if let Some(family) = remembered_family {
			tracing::debug!(target = "ww.session", %family, "last session family remembered");
		}

		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		WalletService {
			registry: ProviderRegistry::new(self.env),
			selector: WalletSelector::new(prompt.clone(), preferences.clone()),
			negotiator,
			preferences,
			prompt,
			notifier: self.notifier.unwrap_or_else(|| Rc::new(TracingNotifier)),
			bridge,
			config,
			state: parking_lot::Mutex::new(State::default()),
			connect_lock: tokio::sync::Mutex::new(()),
			pending: parking_lot::Mutex::new(None),
			events,
			remembered_family,
		}
	}
}
