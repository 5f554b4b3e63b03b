//! Host services the core needs from the page: storage, clock, navigation,
//! notifications and the wallet picker.

use std::time::Duration;

use async_trait::async_trait;
use js_sys::Function;
use wasm_bindgen::JsValue;
use web_sys::Storage;
use ww::{Notifier, PromptChoice, ProviderDescriptor, SelectionPrompt, Severity};
use ww_protocol::NetworkFamily;
use ww_runtime::{Error, KeyValueStore, Launcher, Result, Timer};

use crate::js;

/// `window.localStorage`. Private browsing can make it unavailable; every
/// call then fails with [`Error::Storage`].
pub struct LocalStorageStore {
	storage: Option<Storage>,
}

impl LocalStorageStore {
	pub fn new() -> Self {
		let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
		if storage.is_none() {
			tracing::warn!(target = "ww.page", "localStorage unavailable, preferences will not persist");
		}
		Self { storage }
	}

	fn storage(&self) -> Result<&Storage> {
		self.storage
			.as_ref()
			.ok_or_else(|| Error::Storage("localStorage unavailable".into()))
	}
}

impl Default for LocalStorageStore {
	fn default() -> Self {
		Self::new()
	}
}

fn storage_error(err: JsValue) -> Error {
	Error::Storage(js::stringify(&err))
}

impl KeyValueStore for LocalStorageStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		self.storage()?.get_item(key).map_err(storage_error)
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.storage()?.set_item(key, value).map_err(storage_error)
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.storage()?.remove_item(key).map_err(storage_error)
	}
}

/// `setTimeout` based [`Timer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsTimer;

#[async_trait(?Send)]
impl Timer for JsTimer {
	async fn sleep(&self, duration: Duration) {
		gloo_timers::future::sleep(duration).await;
	}
}

/// Opens deep links by navigating the tab.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsLauncher;

impl Launcher for JsLauncher {
	fn open(&self, url: &str) -> Result<()> {
		let window = web_sys::window().ok_or_else(|| Error::Unavailable("no window".into()))?;
		window
			.location()
			.set_href(url)
			.map_err(|err| Error::Unavailable(js::stringify(&err)))
	}
}

/// Hands status messages to `onStatus(message, severity)` when the page
/// supplied one, otherwise to the devtools console.
pub struct ConsoleNotifier {
	callback: Option<Function>,
}

impl ConsoleNotifier {
	pub fn new(callback: Option<Function>) -> Self {
		Self { callback }
	}
}

fn severity_name(severity: Severity) -> &'static str {
	match severity {
		Severity::Info => "info",
		Severity::Success => "success",
		Severity::Warning => "warning",
		Severity::Error => "error",
	}
}

impl Notifier for ConsoleNotifier {
	fn notify(&self, message: &str, severity: Severity) {
		if let Some(callback) = &self.callback {
			let result = callback.call2(
				&JsValue::NULL,
				&JsValue::from_str(message),
				&JsValue::from_str(severity_name(severity)),
			);
			if let Err(err) = result {
				tracing::warn!(target = "ww.page", error = %js::stringify(&err), "onStatus threw");
			}
			return;
		}

		let text = JsValue::from_str(message);
		match severity {
			Severity::Info | Severity::Success => web_sys::console::info_1(&text),
			Severity::Warning => web_sys::console::warn_1(&text),
			Severity::Error => web_sys::console::error_1(&text),
		}
	}
}

/// Wallet and family pickers implemented by the page.
///
/// `chooseWallet(family, candidates)` may return (or resolve to) an index,
/// `{ index, remember }`, or `null` to cancel. `chooseFamily(suggested)`
/// returns `"evm"`, `"solana"` or `null`. Without `chooseWallet` every
/// multi-wallet dialog is dismissed; without `chooseFamily` the suggestion
/// is taken.
#[derive(Default)]
pub struct CallbackPrompt {
	choose_wallet: Option<Function>,
	choose_family: Option<Function>,
}

impl CallbackPrompt {
	pub fn new(choose_wallet: Option<Function>, choose_family: Option<Function>) -> Self {
		Self {
			choose_wallet,
			choose_family,
		}
	}
}

async fn invoke(callback: &Function, args: &[JsValue]) -> Option<JsValue> {
	let this = JsValue::NULL;
	let result = js::call_function(callback, &this, args).await;
	match result {
		Ok(value) => Some(value),
		Err(err) => {
			tracing::warn!(target = "ww.page", error = %err, "prompt callback failed");
			None
		}
	}
}

pub(crate) fn parse_choice(answer: &serde_json::Value) -> Option<PromptChoice> {
	match answer {
		serde_json::Value::Number(n) => Some(PromptChoice {
			index: usize::try_from(n.as_u64()?).ok()?,
			remember: false,
		}),
		serde_json::Value::Object(object) => Some(PromptChoice {
			index: usize::try_from(object.get("index")?.as_u64()?).ok()?,
			remember: object.get("remember").and_then(|r| r.as_bool()).unwrap_or(false),
		}),
		_ => None,
	}
}

#[async_trait(?Send)]
impl SelectionPrompt for CallbackPrompt {
	async fn choose_wallet(&self, family: NetworkFamily, candidates: &[ProviderDescriptor]) -> Option<PromptChoice> {
		let callback = self.choose_wallet.as_ref()?;
		let candidates = js::to_js(candidates).ok()?;
		let answer = invoke(callback, &[js::to_js(&family).ok()?, candidates]).await?;
		parse_choice(&js::from_js(&answer).ok()?)
	}

	async fn choose_family(&self, suggested: Option<NetworkFamily>) -> Option<NetworkFamily> {
		let Some(callback) = &self.choose_family else {
			return suggested;
		};
		let answer = invoke(callback, &[js::to_js(&suggested).ok()?]).await?;
		answer.as_string()?.parse().ok()
	}
}
