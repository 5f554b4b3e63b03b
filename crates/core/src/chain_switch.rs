//! Getting an EVM wallet onto the target chain.
//!
//! ```text
//! AttemptSwitch --ok--> Done
//!       |--4902--> AttemptAdd --ok--> Done
//!       |                 `--err--> Failed(ChainAddRejected)
//!       `--other--> Failed(ChainSwitchRejected)
//! ```
//!
//! The add step runs at most once per call.

use std::collections::BTreeMap;
use std::rc::Rc;

use ww_protocol::{AddChainParameter, ChainId, NetworkFamily, RequestArguments};
use ww_runtime::Eip1193Provider;

use crate::error::{ConnectError, Result};

/// Source of RPC endpoints handed to wallets when registering a chain.
pub trait EndpointResolver {
	/// `None` falls back to the chain definition's own RPC list.
	fn resolve_endpoint(&self, family: NetworkFamily) -> Option<String>;
}

/// Fixed per-family endpoints.
#[derive(Debug, Clone, Default)]
pub struct StaticEndpoints {
	endpoints: BTreeMap<NetworkFamily, String>,
}

impl StaticEndpoints {
	pub fn new(endpoints: BTreeMap<NetworkFamily, String>) -> Self {
		Self { endpoints }
	}
}

impl EndpointResolver for StaticEndpoints {
	fn resolve_endpoint(&self, family: NetworkFamily) -> Option<String> {
		self.endpoints.get(&family).cloned()
	}
}

#[derive(Debug)]
enum SwitchState {
	AttemptSwitch,
	AttemptAdd,
	Done,
	Failed(ConnectError),
}

pub struct ChainSwitchProtocol {
	target: AddChainParameter,
	resolver: Rc<dyn EndpointResolver>,
}

impl ChainSwitchProtocol {
	pub fn new(target: AddChainParameter, resolver: Rc<dyn EndpointResolver>) -> Self {
		Self { target, resolver }
	}

	pub fn target(&self) -> ChainId {
		self.target.chain_id
	}

	/// Chain definition sent with `wallet_addEthereumChain`.
	pub fn add_chain_parameter(&self) -> AddChainParameter {
		match self.resolver.resolve_endpoint(NetworkFamily::Evm) {
			Some(url) => self.target.clone().with_rpc_url(url),
			None => self.target.clone(),
		}
	}

	/// Drives `provider` to the target chain and returns its id.
	pub async fn ensure_chain(&self, provider: &dyn Eip1193Provider) -> Result<ChainId> {
		let chain = self.target.chain_id;
		let mut state = SwitchState::AttemptSwitch;

		loop {
			state = match state {
				SwitchState::AttemptSwitch => {
					tracing::debug!(target = "ww.chain", %chain, "requesting chain switch");
					match provider.request(RequestArguments::switch_chain(chain)).await {
						Ok(_) => SwitchState::Done,
						Err(err) if err.is_unrecognized_chain() => {
							tracing::info!(target = "ww.chain", %chain, "wallet does not know the chain; adding it");
							SwitchState::AttemptAdd
						}
						Err(err) => SwitchState::Failed(ConnectError::ChainSwitchRejected {
							chain,
							code: err.rpc().map(|e| e.code),
							message: err.rpc().map(|e| e.message.clone()).unwrap_or_else(|| err.to_string()),
						}),
					}
				}
				SwitchState::AttemptAdd => {
					let param = self.add_chain_parameter();
					tracing::debug!(target = "ww.chain", %chain, rpc = ?param.rpc_urls, "requesting chain add");
					match provider.request(RequestArguments::add_chain(&param)).await {
						Ok(_) => SwitchState::Done,
						Err(err) => SwitchState::Failed(ConnectError::ChainAddRejected {
							chain,
							code: err.rpc().map(|e| e.code),
							message: err.rpc().map(|e| e.message.clone()).unwrap_or_else(|| err.to_string()),
						}),
					}
				}
				SwitchState::Done => {
					tracing::info!(target = "ww.chain", %chain, name = %chain.display_name(), "wallet on target chain");
					return Ok(chain);
				}
				SwitchState::Failed(err) => {
					tracing::warn!(target = "ww.chain", %chain, error = %err, "chain switch failed");
					return Err(err);
				}
			};
		}
	}
}
