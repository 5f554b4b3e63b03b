//! EIP-1193 request payloads and provider errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::{AddChainParameter, ChainId, SwitchChainParameter};

/// JSON-RPC method names used by the connection flow.
pub mod methods {
	pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
	pub const ACCOUNTS: &str = "eth_accounts";
	pub const CHAIN_ID: &str = "eth_chainId";
	pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
	pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
	/// Non-standard; Phantom accepts it through `request()` to revoke trust.
	pub const DISCONNECT: &str = "disconnect";
}

/// Provider error codes (EIP-1193 and EIP-3085/3326).
pub mod codes {
	pub const USER_REJECTED: i64 = 4001;
	pub const UNAUTHORIZED: i64 = 4100;
	pub const UNSUPPORTED_METHOD: i64 = 4200;
	pub const DISCONNECTED: i64 = 4900;
	pub const CHAIN_DISCONNECTED: i64 = 4901;
	pub const UNRECOGNIZED_CHAIN: i64 = 4902;
	/// A request of the same kind is already pending in the wallet UI.
	pub const REQUEST_PENDING: i64 = -32002;
}

/// Argument object passed to `provider.request()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
	pub method: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub params: Option<Value>,
}

impl RequestArguments {
	pub fn new(method: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			params: None,
		}
	}

	pub fn with_params(mut self, params: Value) -> Self {
		self.params = Some(params);
		self
	}

	pub fn request_accounts() -> Self {
		Self::new(methods::REQUEST_ACCOUNTS)
	}

	pub fn chain_id() -> Self {
		Self::new(methods::CHAIN_ID)
	}

	pub fn switch_chain(chain_id: ChainId) -> Self {
		let param = SwitchChainParameter { chain_id };
		Self::new(methods::SWITCH_CHAIN).with_params(serde_json::json!([param]))
	}

	pub fn add_chain(chain: &AddChainParameter) -> Self {
		Self::new(methods::ADD_CHAIN).with_params(serde_json::json!([chain]))
	}

	pub fn disconnect() -> Self {
		Self::new(methods::DISCONNECT)
	}
}

/// Error object a provider rejects a request with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRpcError {
	pub code: i64,
	#[serde(default)]
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

impl ProviderRpcError {
	pub fn new(code: i64, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
			data: None,
		}
	}

	pub fn user_rejected() -> Self {
		Self::new(codes::USER_REJECTED, "User rejected the request.")
	}

	pub fn unrecognized_chain(chain_id: ChainId) -> Self {
		Self::new(
			codes::UNRECOGNIZED_CHAIN,
			format!("Unrecognized chain ID \"{chain_id}\". Try adding the chain using wallet_addEthereumChain first."),
		)
	}

	/// Code 4001, or one of the rejection phrasings wallets use without a code.
	pub fn is_user_rejection(&self) -> bool {
		if self.code == codes::USER_REJECTED {
			return true;
		}
		let message = self.message.to_ascii_lowercase();
		["user rejected", "user denied", "user cancelled", "user canceled"]
			.iter()
			.any(|needle| message.contains(needle))
	}

	/// Code 4902. MetaMask mobile nests it under `data.originalError.code`.
	pub fn is_unrecognized_chain(&self) -> bool {
		self.code == codes::UNRECOGNIZED_CHAIN
			|| self
				.data
				.as_ref()
				.and_then(|data| data.pointer("/originalError/code"))
				.and_then(Value::as_i64)
				== Some(codes::UNRECOGNIZED_CHAIN)
	}
}

impl fmt::Display for ProviderRpcError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (code {})", self.message, self.code)
	}
}

impl std::error::Error for ProviderRpcError {}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn switch_chain_payload() {
		let args = RequestArguments::switch_chain(ChainId::BASE);
		assert_eq!(
			serde_json::to_value(args).unwrap(),
			json!({ "method": "wallet_switchEthereumChain", "params": [{ "chainId": "0x2105" }] })
		);
	}

	#[test]
	fn request_accounts_omits_params() {
		let value = serde_json::to_value(RequestArguments::request_accounts()).unwrap();
		assert_eq!(value, json!({ "method": "eth_requestAccounts" }));
	}

	#[test]
	fn rejection_by_code_or_message() {
		assert!(ProviderRpcError::user_rejected().is_user_rejection());
		assert!(ProviderRpcError::new(-32603, "User denied account authorization").is_user_rejection());
		assert!(!ProviderRpcError::new(-32603, "Internal error").is_user_rejection());
	}

	#[test]
	fn unrecognized_chain_nested_code() {
		let mut err = ProviderRpcError::new(-32603, "Unrecognized chain");
		assert!(!err.is_unrecognized_chain());
		err.data = Some(json!({ "originalError": { "code": 4902 } }));
		assert!(err.is_unrecognized_chain());
		assert!(ProviderRpcError::unrecognized_chain(ChainId::BASE).is_unrecognized_chain());
	}

	#[test]
	fn deserializes_partial_error_object() {
		let err: ProviderRpcError = serde_json::from_value(json!({ "code": 4001 })).unwrap();
		assert_eq!(err.code, 4001);
		assert!(err.message.is_empty());
	}
}
