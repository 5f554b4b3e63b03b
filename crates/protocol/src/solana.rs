//! Solana wallet adapter `connect()` options and result shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options accepted by `connect()` on Phantom-compatible adapters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
	/// `true` connects silently only if the site is already trusted.
	pub only_if_trusted: bool,
}

impl ConnectOptions {
	/// Always show the approval popup.
	pub fn prompt() -> Self {
		Self {
			only_if_trusted: false,
		}
	}
}

/// What a `connect()` call resolved with.
///
/// Adapters disagree: Phantom resolves with `{ publicKey }`, others resolve with
/// `true`, nothing, or an unrelated value and expose `publicKey` on the adapter
/// object afterwards. Only [`WithPublicKey`](Self::WithPublicKey) is final; the
/// other two mean "read the key off the adapter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectResponse {
	/// Resolved with an object carrying the key.
	WithPublicKey(String),
	/// Resolved without a `publicKey` field.
	Acknowledged,
	/// Resolved with a `publicKey` field that is not a usable string. Holds a
	/// short description of the shape for logging.
	Unsupported(String),
}

impl ConnectResponse {
	pub fn classify(value: &Value) -> Self {
		let Value::Object(map) = value else {
			return ConnectResponse::Acknowledged;
		};
		match map.get("publicKey") {
			None | Some(Value::Null) => ConnectResponse::Acknowledged,
			Some(Value::String(key)) if !key.is_empty() => ConnectResponse::WithPublicKey(key.clone()),
			Some(Value::String(_)) => ConnectResponse::Unsupported("object with empty publicKey".to_string()),
			Some(other) => ConnectResponse::Unsupported(format!("object with publicKey {}", shape_of(other))),
		}
	}
}

fn shape_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(true) => "true",
		Value::Bool(false) => "false",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn object_with_key() {
		assert_eq!(
			ConnectResponse::classify(&json!({ "publicKey": "9xQeWvG816bUx9EP" })),
			ConnectResponse::WithPublicKey("9xQeWvG816bUx9EP".into())
		);
	}

	#[test]
	fn anything_without_a_key_field_is_acknowledged() {
		for value in [json!(true), Value::Null, json!(false), json!(42), json!("ok"), json!([]), json!({ "ok": true })] {
			assert_eq!(ConnectResponse::classify(&value), ConnectResponse::Acknowledged, "{value}");
		}
		assert_eq!(
			ConnectResponse::classify(&json!({ "publicKey": null })),
			ConnectResponse::Acknowledged
		);
	}

	#[test]
	fn unusable_key_field_is_unsupported() {
		for value in [json!({ "publicKey": "" }), json!({ "publicKey": 7 }), json!({ "publicKey": {} })] {
			assert!(matches!(ConnectResponse::classify(&value), ConnectResponse::Unsupported(_)), "{value}");
		}
	}

	#[test]
	fn connect_options_wire_form() {
		assert_eq!(
			serde_json::to_value(ConnectOptions::prompt()).unwrap(),
			json!({ "onlyIfTrusted": false })
		);
	}
}
