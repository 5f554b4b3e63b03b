//! Error types for provider calls and host services.

use thiserror::Error;
use ww_protocol::ProviderRpcError;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the provider boundary.
#[derive(Debug, Error)]
pub enum Error {
	/// The provider rejected a request with an EIP-1193 style error object.
	#[error("Provider error: {0}")]
	Rpc(#[from] ProviderRpcError),

	/// The injected object lacks the method being called.
	#[error("Provider does not support {0}")]
	Unsupported(String),

	/// The provider threw something that is not an error object, or the
	/// call could not be made at all.
	#[error("Provider unavailable: {0}")]
	Unavailable(String),

	/// A resolved value did not have the expected shape.
	#[error("Invalid provider response: {0}")]
	InvalidResponse(String),

	/// Key/value storage failed (quota, private mode, I/O).
	#[error("Storage error: {0}")]
	Storage(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	pub fn rpc(&self) -> Option<&ProviderRpcError> {
		match self {
			Error::Rpc(err) => Some(err),
			_ => None,
		}
	}

	/// Whether the user dismissed or declined the wallet popup.
	pub fn is_user_rejection(&self) -> bool {
		self.rpc().is_some_and(ProviderRpcError::is_user_rejection)
	}

	pub fn is_unrecognized_chain(&self) -> bool {
		self.rpc().is_some_and(ProviderRpcError::is_unrecognized_chain)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_wrapped_rpc_errors() {
		let rejected = Error::from(ProviderRpcError::user_rejected());
		assert!(rejected.is_user_rejection());
		assert!(!rejected.is_unrecognized_chain());

		let missing = Error::Unsupported("connect".into());
		assert!(!missing.is_user_rejection());
		assert_eq!(missing.to_string(), "Provider does not support connect");
	}
}
