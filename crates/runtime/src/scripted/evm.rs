use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use ww_protocol::{
	AddChainParameter, ChainId, ProviderEvent, ProviderRpcError, RequestArguments, SwitchChainParameter,
	codes, methods,
};

use super::fixture::EvmWalletFixture;
use crate::error::{Error, Result};
use crate::provider::{Eip1193Provider, ProviderEvents};

/// In-memory EIP-1193 wallet driven by an [`EvmWalletFixture`].
#[derive(Debug)]
pub struct ScriptedEvmProvider {
	fixture: EvmWalletFixture,
	state: Mutex<EvmState>,
	calls: Mutex<Vec<RequestArguments>>,
	listeners: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
}

#[derive(Debug)]
struct EvmState {
	chain_id: ChainId,
	known_chains: Vec<ChainId>,
	added: Vec<AddChainParameter>,
}

impl ScriptedEvmProvider {
	pub fn new(fixture: EvmWalletFixture) -> Self {
		let mut known_chains = fixture.known_chains.clone();
		if !known_chains.contains(&fixture.chain_id) {
			known_chains.push(fixture.chain_id);
		}
		Self {
			state: Mutex::new(EvmState {
				chain_id: fixture.chain_id,
				known_chains,
				added: Vec::new(),
			}),
			fixture,
			calls: Mutex::new(Vec::new()),
			listeners: Mutex::new(Vec::new()),
		}
	}

	pub fn flags(&self) -> &[String] {
		&self.fixture.flags
	}

	/// Every request received, in order.
	pub fn calls(&self) -> Vec<RequestArguments> {
		self.calls.lock().clone()
	}

	pub fn call_methods(&self) -> Vec<String> {
		self.calls.lock().iter().map(|c| c.method.clone()).collect()
	}

	pub fn count(&self, method: &str) -> usize {
		self.calls.lock().iter().filter(|c| c.method == method).count()
	}

	pub fn chain_id(&self) -> ChainId {
		self.state.lock().chain_id
	}

	/// Chains registered through `wallet_addEthereumChain`.
	pub fn added_chains(&self) -> Vec<AddChainParameter> {
		self.state.lock().added.clone()
	}

	/// Delivers an event to every live subscriber.
	pub fn emit(&self, event: ProviderEvent) {
		self.listeners.lock().retain(|tx| tx.send(event.clone()).is_ok());
	}

	fn switch_chain(&self, params: Option<&Value>) -> Result<Value> {
		let SwitchChainParameter { chain_id } = first_param(params)?;
		if let Some(err) = &self.fixture.switch_error {
			return Err(err.clone().into());
		}
		let mut state = self.state.lock();
		if !state.known_chains.contains(&chain_id) {
			return Err(ProviderRpcError::unrecognized_chain(chain_id).into());
		}
		let changed = state.chain_id != chain_id;
		state.chain_id = chain_id;
		drop(state);
		if changed {
			self.emit(ProviderEvent::ChainChanged(chain_id.to_hex()));
		}
		Ok(Value::Null)
	}

	fn add_chain(&self, params: Option<&Value>) -> Result<Value> {
		let chain: AddChainParameter = first_param(params)?;
		if let Some(err) = &self.fixture.add_error {
			return Err(err.clone().into());
		}
		let mut state = self.state.lock();
		if !state.known_chains.contains(&chain.chain_id) {
			state.known_chains.push(chain.chain_id);
		}
		// Wallets switch to a freshly added chain as part of the approval.
		state.chain_id = chain.chain_id;
		state.added.push(chain);
		Ok(Value::Null)
	}
}

fn first_param<T: serde::de::DeserializeOwned>(params: Option<&Value>) -> Result<T> {
	let first = params
		.and_then(|p| p.get(0))
		.cloned()
		.ok_or_else(|| Error::Rpc(ProviderRpcError::new(-32602, "Expected an array with one parameter")))?;
	Ok(serde_json::from_value(first)?)
}

#[async_trait(?Send)]
impl Eip1193Provider for ScriptedEvmProvider {
	async fn request(&self, args: RequestArguments) -> Result<Value> {
		self.calls.lock().push(args.clone());
		match args.method.as_str() {
			methods::REQUEST_ACCOUNTS => {
				if self.fixture.reject_accounts {
					return Err(ProviderRpcError::user_rejected().into());
				}
				Ok(json!(self.fixture.accounts))
			}
			methods::ACCOUNTS => Ok(json!(self.fixture.accounts)),
			methods::CHAIN_ID => Ok(json!(self.chain_id().to_hex())),
			methods::SWITCH_CHAIN => self.switch_chain(args.params.as_ref()),
			methods::ADD_CHAIN => self.add_chain(args.params.as_ref()),
			other => Err(ProviderRpcError::new(
				codes::UNSUPPORTED_METHOD,
				format!("The method \"{other}\" is not supported"),
			)
			.into()),
		}
	}

	fn subscribe(&self) -> Option<ProviderEvents> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.listeners.lock().push(tx);
		Some(rx)
	}
}
