//! Connection failure taxonomy.

use thiserror::Error;
use ww_protocol::{ChainId, NetworkFamily};

/// Result type alias for connection operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Why a connection attempt did not produce a session.
///
/// This set is closed: provider errors are translated into it at the
/// negotiator boundary and nothing else escapes to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
	#[error("No compatible {} wallets found", .family.label())]
	NoProviderFound { family: NetworkFamily },

	/// The user closed the wallet picker.
	#[error("Wallet selection was cancelled")]
	SelectionCancelled,

	/// The user declined the wallet's approval popup.
	#[error("User rejected the request: {message}")]
	UserRejected { message: String },

	#[error("Wallet returned no accounts")]
	NoAccountsReturned,

	#[error("Wallet did not expose a public key")]
	NoPublicKeyFound,

	#[error("Unexpected response from wallet: {shape}")]
	UnsupportedResponseShape { shape: String },

	#[error("Switching to {} was rejected: {message}", .chain.display_name())]
	ChainSwitchRejected {
		chain: ChainId,
		code: Option<i64>,
		message: String,
	},

	#[error("Adding {} was rejected: {message}", .chain.display_name())]
	ChainAddRejected {
		chain: ChainId,
		code: Option<i64>,
		message: String,
	},

	/// Any other provider failure: missing methods, pending requests,
	/// thrown non-error values.
	#[error("Wallet error: {message}")]
	ProviderFailure { code: Option<i64>, message: String },

	/// The wallet app opened through a deep link never injected a provider.
	#[error("Wallet app did not return within {timeout_ms}ms")]
	DeepLinkTimeout { timeout_ms: u64 },
}

impl ConnectError {
	/// Translates a provider-boundary error. Rejections become
	/// [`UserRejected`](Self::UserRejected); everything else is a
	/// [`ProviderFailure`](Self::ProviderFailure).
	pub fn from_provider(err: ww_runtime::Error) -> Self {
		match err.rpc() {
			Some(rpc) if rpc.is_user_rejection() => ConnectError::UserRejected {
				message: rpc.message.clone(),
			},
			Some(rpc) => ConnectError::ProviderFailure {
				code: Some(rpc.code),
				message: rpc.message.clone(),
			},
			None => ConnectError::ProviderFailure {
				code: None,
				message: err.to_string(),
			},
		}
	}

	/// Cancellations are a user decision, not a failure.
	pub fn is_benign(&self) -> bool {
		matches!(self, ConnectError::SelectionCancelled | ConnectError::UserRejected { .. })
	}

	/// Stable machine-readable code.
	pub fn code(&self) -> &'static str {
		match self {
			ConnectError::NoProviderFound { .. } => "NO_PROVIDER_FOUND",
			ConnectError::SelectionCancelled => "SELECTION_CANCELLED",
			ConnectError::UserRejected { .. } => "USER_REJECTED",
			ConnectError::NoAccountsReturned => "NO_ACCOUNTS_RETURNED",
			ConnectError::NoPublicKeyFound => "NO_PUBLIC_KEY_FOUND",
			ConnectError::UnsupportedResponseShape { .. } => "UNSUPPORTED_RESPONSE_SHAPE",
			ConnectError::ChainSwitchRejected { .. } => "CHAIN_SWITCH_REJECTED",
			ConnectError::ChainAddRejected { .. } => "CHAIN_ADD_REJECTED",
			ConnectError::ProviderFailure { .. } => "PROVIDER_FAILURE",
			ConnectError::DeepLinkTimeout { .. } => "DEEP_LINK_TIMEOUT",
		}
	}

	/// Message shown to the user in the status banner.
	pub fn user_message(&self) -> String {
		let hint = match self {
			ConnectError::SelectionCancelled | ConnectError::UserRejected { .. } => {
				return "Connection was cancelled.".to_string();
			}
			ConnectError::NoProviderFound {
				family: NetworkFamily::Solana,
			} => "Please install a Solana wallet like Phantom or Solflare.".to_string(),
			ConnectError::NoProviderFound {
				family: NetworkFamily::Evm,
			} => "Please install a Web3 wallet like MetaMask or Coinbase Wallet.".to_string(),
			ConnectError::ChainSwitchRejected { chain, .. } | ConnectError::ChainAddRejected { chain, .. } => {
				format!("Please switch your wallet to {} and try again.", chain.display_name())
			}
			ConnectError::DeepLinkTimeout { .. } => {
				"The wallet app did not return to this page. Please try again.".to_string()
			}
			_ => "Please check your wallet and try again.".to_string(),
		};
		format!("Connection failed. {hint}")
	}
}
