//! Injected wallet objects behind the runtime provider traits.

use std::cell::RefCell;

use async_trait::async_trait;
use js_sys::Function;
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedSender};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use ww_protocol::{ConnectOptions, ProviderEvent, RequestArguments};
use ww_runtime::{Eip1193Provider, ProviderEvents, Result, SolanaProvider};

use crate::js;

/// A listener registered with `provider.on(name, fn)`. Dropping it calls
/// `removeListener` and closes the channel the callback feeds.
struct Listener {
	target: JsValue,
	event: &'static str,
	callback: Closure<dyn FnMut(JsValue)>,
}

impl Drop for Listener {
	fn drop(&mut self) {
		let Some(remove) = js::get(&self.target, "removeListener").and_then(|f| f.dyn_into::<Function>().ok()) else {
			return;
		};
		let _ = remove.call2(
			&self.target,
			&JsValue::from_str(self.event),
			self.callback.as_ref(),
		);
	}
}

/// Registers one listener per event name. Previous listeners registered
/// through the same [`Listeners`] are dropped first, so at most one watcher
/// is fed at a time.
#[derive(Default)]
struct Listeners(RefCell<Vec<Listener>>);

impl Listeners {
	fn subscribe(
		&self,
		target: &JsValue,
		events: &[&'static str],
		map: fn(&str, &JsValue) -> Option<ProviderEvent>,
	) -> Option<ProviderEvents> {
		let on: Function = js::get(target, "on")?.dyn_into().ok()?;
		self.0.borrow_mut().clear();

		let (tx, rx) = mpsc::unbounded_channel();
		let mut registered = Vec::with_capacity(events.len());
		for &event in events {
			let callback = listener_callback(event, tx.clone(), map);
			if let Err(err) = on.call2(target, &JsValue::from_str(event), callback.as_ref()) {
				tracing::warn!(target = "ww.page", event, error = %js::stringify(&err), "provider.on threw");
				continue;
			}
			registered.push(Listener {
				target: target.clone(),
				event,
				callback,
			});
		}
		if registered.is_empty() {
			return None;
		}
		*self.0.borrow_mut() = registered;
		Some(rx)
	}
}

fn listener_callback(
	event: &'static str,
	tx: UnboundedSender<ProviderEvent>,
	map: fn(&str, &JsValue) -> Option<ProviderEvent>,
) -> Closure<dyn FnMut(JsValue)> {
	Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| match map(event, &payload) {
		Some(parsed) => {
			let _ = tx.send(parsed);
		}
		None => tracing::debug!(target = "ww.page", event, "ignoring malformed provider event"),
	})
}

fn evm_event(name: &str, payload: &JsValue) -> Option<ProviderEvent> {
	let payload = js::from_js(payload).ok()?;
	ProviderEvent::from_listener(name, &payload)
}

/// Solana adapters emit `accountChanged` with a `PublicKey` (or `null`
/// when the user switched to an account the site cannot see).
fn solana_event(name: &str, payload: &JsValue) -> Option<ProviderEvent> {
	match name {
		"accountChanged" => Some(ProviderEvent::AccountsChanged(
			js::to_string(payload).into_iter().collect(),
		)),
		"disconnect" => Some(ProviderEvent::Disconnect),
		_ => None,
	}
}

/// An EIP-1193 object such as `window.ethereum` or an entry of its
/// `providers` array.
pub struct JsEvmProvider {
	inner: JsValue,
	listeners: Listeners,
}

impl JsEvmProvider {
	pub fn new(inner: JsValue) -> Self {
		Self {
			inner,
			listeners: Listeners::default(),
		}
	}

	pub fn inner(&self) -> &JsValue {
		&self.inner
	}
}

#[async_trait(?Send)]
impl Eip1193Provider for JsEvmProvider {
	async fn request(&self, args: RequestArguments) -> Result<Value> {
		tracing::debug!(target = "ww.page", method = %args.method, "eip1193 request");
		let payload = js::to_js(&args)?;
		let result = js::call_method(&self.inner, "request", &[payload]).await?;
		js::from_js(&result)
	}

	fn subscribe(&self) -> Option<ProviderEvents> {
		self.listeners.subscribe(&self.inner, &ProviderEvent::NAMES, evm_event)
	}
}

/// A Phantom-compatible Solana adapter.
pub struct JsSolanaProvider {
	inner: JsValue,
	listeners: Listeners,
}

impl JsSolanaProvider {
	pub fn new(inner: JsValue) -> Self {
		Self {
			inner,
			listeners: Listeners::default(),
		}
	}

	pub fn inner(&self) -> &JsValue {
		&self.inner
	}
}

/// Adapters resolve `connect()` with `{ publicKey: PublicKey }`; the
/// core expects the key as a string.
fn normalize_connect_response(resolved: &JsValue) -> Result<Value> {
	let Some(public_key) = js::get(resolved, "publicKey") else {
		return js::from_js(resolved);
	};
	let mut object = Map::new();
	if let Some(key) = js::to_string(&public_key) {
		object.insert("publicKey".into(), Value::String(key));
	}
	Ok(Value::Object(object))
}

#[async_trait(?Send)]
impl SolanaProvider for JsSolanaProvider {
	async fn connect(&self, options: Option<ConnectOptions>) -> Result<Value> {
		let args = match options {
			Some(options) => vec![js::to_js(&options)?],
			None => Vec::new(),
		};
		let resolved = js::call_method(&self.inner, "connect", &args).await?;
		normalize_connect_response(&resolved)
	}

	async fn disconnect(&self) -> Result<()> {
		js::call_method(&self.inner, "disconnect", &[]).await?;
		Ok(())
	}

	fn supports_request(&self) -> bool {
		js::has_method(&self.inner, "request")
	}

	async fn request(&self, args: RequestArguments) -> Result<Value> {
		let payload = js::to_js(&args)?;
		let result = js::call_method(&self.inner, "request", &[payload]).await?;
		js::from_js(&result)
	}

	fn public_key(&self) -> Option<String> {
		js::get(&self.inner, "publicKey").and_then(|key| js::to_string(&key))
	}

	fn subscribe(&self) -> Option<ProviderEvents> {
		self.listeners
			.subscribe(&self.inner, &["accountChanged", "disconnect"], solana_event)
	}
}
