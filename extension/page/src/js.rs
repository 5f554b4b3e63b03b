//! Small helpers over `js_sys::Reflect` for poking at injected objects.

use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use ww_protocol::ProviderRpcError;
use ww_runtime::{Error, Result};

/// `target[key]`, with `undefined`/`null` and throwing getters folded to `None`.
pub fn get(target: &JsValue, key: &str) -> Option<JsValue> {
	if !target.is_object() && !target.is_function() {
		return None;
	}
	Reflect::get(target, &JsValue::from_str(key))
		.ok()
		.filter(|v| !v.is_undefined() && !v.is_null())
}

/// Follows a dotted path such as `selectedProvider.isCoinbaseWallet`.
pub fn get_path(target: &JsValue, path: &str) -> Option<JsValue> {
	path.split('.').try_fold(target.clone(), |obj, key| get(&obj, key))
}

pub fn truthy(target: &JsValue, path: &str) -> bool {
	get_path(target, path).is_some_and(|v| v.is_truthy())
}

pub fn has_method(target: &JsValue, name: &str) -> bool {
	get(target, name).is_some_and(|v| v.is_function())
}

/// Calls `target[name](...args)` with `this` bound to `target`, awaiting the
/// result when it is a promise.
pub async fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue> {
	let method: Function = get(target, name)
		.and_then(|v| v.dyn_into().ok())
		.ok_or_else(|| Error::Unsupported(name.to_string()))?;
	call_function(&method, target, args).await
}

/// `function.apply(this, args)`, awaiting a returned promise.
pub async fn call_function(function: &Function, this: &JsValue, args: &[JsValue]) -> Result<JsValue> {
	let result = function
		.apply(this, &args.iter().collect::<Array>())
		.map_err(to_error)?;

	match result.dyn_into::<Promise>() {
		Ok(promise) => JsFuture::from(promise).await.map_err(to_error),
		Err(value) => Ok(value),
	}
}

/// Maps a thrown value to a runtime error. Objects carrying a numeric `code`
/// are EIP-1193 errors, anything else is opaque.
pub fn to_error(thrown: JsValue) -> Error {
	let code = get(&thrown, "code").and_then(|c| c.as_f64());
	match code {
		Some(code) => Error::Rpc(ProviderRpcError {
			code: code as i64,
			message: get(&thrown, "message")
				.and_then(|m| m.as_string())
				.unwrap_or_default(),
			data: get(&thrown, "data").and_then(|d| from_js(&d).ok()),
		}),
		None => Error::Unavailable(stringify(&thrown)),
	}
}

/// Best effort text for a thrown value.
pub fn stringify(value: &JsValue) -> String {
	if let Some(s) = value.as_string() {
		return s;
	}
	if let Some(message) = get(value, "message").and_then(|m| m.as_string()) {
		return message;
	}
	js_sys::JSON::stringify(value)
		.ok()
		.and_then(|s| s.as_string())
		.unwrap_or_else(|| format!("{value:?}"))
}

/// Plain JSON to a JS value; objects become plain objects, not `Map`s.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
	value
		.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
		.map_err(|err| Error::InvalidResponse(err.to_string()))
}

/// JS value to JSON. `undefined` reads as `null`.
pub fn from_js(value: &JsValue) -> Result<Value> {
	if value.is_undefined() {
		return Ok(Value::Null);
	}
	serde_wasm_bindgen::from_value(value.clone()).map_err(|err| Error::InvalidResponse(err.to_string()))
}

/// `String(value)`, used for Solana `PublicKey` objects.
pub fn to_string(value: &JsValue) -> Option<String> {
	if let Some(s) = value.as_string() {
		return Some(s);
	}
	let text = value.dyn_ref::<Object>()?.to_string().as_string()?;
	(!text.is_empty() && text != "[object Object]").then_some(text)
}
