//! `WalletClient`, the class the launchpad page talks to.

use std::rc::Rc;

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use ww::{NetworkFamily, WalletConfig, WalletService};

use crate::env::WindowEnvironment;
use crate::host::{CallbackPrompt, ConsoleNotifier, JsLauncher, JsTimer, LocalStorageStore};
use crate::js;
use crate::logging;

/// Options accepted by `new WalletClient(options)`.
///
/// ```js
/// new WalletClient({
///   config: { forceFreshApproval: true, deepLink: { timeoutMs: 20000 } },
///   chooseWallet: async (family, candidates) => ({ index: 0, remember: true }),
///   chooseFamily: async (suggested) => suggested ?? "solana",
///   onStatus: (message, severity) => toast(message, severity),
///   logLevel: "debug",
/// })
/// ```
struct ClientOptions {
	config: WalletConfig,
	choose_wallet: Option<Function>,
	choose_family: Option<Function>,
	on_status: Option<Function>,
	log_level: Option<String>,
}

fn function(options: &JsValue, key: &str) -> Option<Function> {
	js::get(options, key).and_then(|f| f.dyn_into().ok())
}

impl ClientOptions {
	fn from_js(options: &JsValue) -> Result<Self, JsError> {
		let config = match js::get(options, "config") {
			Some(config) => serde_wasm_bindgen::from_value(config)
				.map_err(|err| JsError::new(&format!("invalid wallet config: {err}")))?,
			None => WalletConfig::default(),
		};
		Ok(Self {
			config,
			choose_wallet: function(options, "chooseWallet"),
			choose_family: function(options, "chooseFamily"),
			on_status: function(options, "onStatus"),
			log_level: js::get(options, "logLevel").and_then(|l| l.as_string()),
		})
	}
}

fn parse_family(family: Option<String>) -> Result<Option<NetworkFamily>, JsError> {
	family
		.map(|f| f.parse().map_err(|err: String| JsError::new(&err)))
		.transpose()
}

#[wasm_bindgen]
pub struct WalletClient {
	service: Rc<WalletService>,
}

#[wasm_bindgen]
impl WalletClient {
	#[wasm_bindgen(constructor)]
	pub fn new(options: JsValue) -> Result<WalletClient, JsError> {
		let options = ClientOptions::from_js(&options)?;
		logging::init_logging(options.log_level.as_deref());

		let env = WindowEnvironment::new().ok_or_else(|| JsError::new("WalletClient needs a window"))?;
		let service = WalletService::builder(Rc::new(env), Rc::new(JsTimer))
			.store(Rc::new(LocalStorageStore::new()))
			.prompt(Rc::new(CallbackPrompt::new(options.choose_wallet, options.choose_family)))
			.notifier(Rc::new(ConsoleNotifier::new(options.on_status)))
			.launcher(Rc::new(JsLauncher))
			.config(options.config)
			.build();

		tracing::info!(target = "ww.page", "wallet client ready");
		Ok(WalletClient {
			service: Rc::new(service),
		})
	}

	/// Resolves `true` once connected. Failures resolve `false` after the
	/// status callback has been told why.
	pub fn connect(&self, family: Option<String>) -> Result<Promise, JsError> {
		let family = parse_family(family)?;
		let service = Rc::clone(&self.service);
		Ok(future_to_promise(async move {
			let connected = service.connect(family).await;
			if connected {
				let watcher = Rc::clone(&service);
				spawn_local(async move { watcher.watch_provider_events().await });
			}
			Ok(JsValue::from_bool(connected))
		}))
	}

	pub fn disconnect(&self) -> Promise {
		let service = Rc::clone(&self.service);
		future_to_promise(async move {
			service.disconnect().await;
			Ok(JsValue::UNDEFINED)
		})
	}

	/// Abandons an in-flight connect. `true` if one was pending.
	#[wasm_bindgen(js_name = cancelPending)]
	pub fn cancel_pending(&self) -> bool {
		self.service.cancel_pending()
	}

	#[wasm_bindgen(getter, js_name = isConnected)]
	pub fn is_connected(&self) -> bool {
		self.service.is_connected()
	}

	#[wasm_bindgen(getter, js_name = currentAccount)]
	pub fn current_account(&self) -> Option<String> {
		self.service.current_account()
	}

	/// `eip155:<id>` or `solana`.
	#[wasm_bindgen(getter, js_name = currentChain)]
	pub fn current_chain(&self) -> Option<String> {
		self.service.current_chain().map(|chain| chain.to_string())
	}

	pub fn snapshot(&self) -> Result<JsValue, JsError> {
		js::to_js(&self.service.snapshot()).map_err(|err| JsError::new(&err.to_string()))
	}

	/// Wallets injected for `family`, as the picker would list them.
	pub fn detect(&self, family: String) -> Result<JsValue, JsError> {
		let family = parse_family(Some(family))?.unwrap_or(NetworkFamily::Evm);
		js::to_js(&self.service.detect(family)).map_err(|err| JsError::new(&err.to_string()))
	}

	#[wasm_bindgen(js_name = clearPreferences)]
	pub fn clear_preferences(&self, family: Option<String>) -> Result<(), JsError> {
		let family = parse_family(family)?;
		self.service
			.clear_preferences(family)
			.map_err(|err| JsError::new(&err.to_string()))
	}

	/// Calls `callback(event)` for every session event from now on.
	#[wasm_bindgen(js_name = onEvent)]
	pub fn on_event(&self, callback: Function) {
		let mut events = self.service.subscribe();
		spawn_local(async move {
			while let Some(event) = events.recv().await {
				let payload = match js::to_js(&event) {
					Ok(payload) => payload,
					Err(err) => {
						tracing::warn!(target = "ww.page", error = %err, "session event not serializable");
						continue;
					}
				};
				if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
					tracing::warn!(target = "ww.page", error = %js::stringify(&err), "onEvent callback threw");
				}
			}
		});
	}
}
