use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use ww_protocol::{ConnectOptions, ProviderEvent, ProviderRpcError, RequestArguments};

use super::fixture::SolanaWalletFixture;
use crate::error::{Error, Result};
use crate::provider::{ProviderEvents, SolanaProvider};

/// In-memory Solana adapter driven by a [`SolanaWalletFixture`].
#[derive(Debug)]
pub struct ScriptedSolanaProvider {
	fixture: SolanaWalletFixture,
	connected: Mutex<bool>,
	calls: Mutex<Vec<String>>,
	listeners: Mutex<Vec<mpsc::UnboundedSender<ProviderEvent>>>,
}

impl ScriptedSolanaProvider {
	pub fn new(fixture: SolanaWalletFixture) -> Self {
		Self {
			fixture,
			connected: Mutex::new(false),
			calls: Mutex::new(Vec::new()),
			listeners: Mutex::new(Vec::new()),
		}
	}

	pub fn flags(&self) -> &[String] {
		&self.fixture.flags
	}

	/// Calls received, e.g. `connect`, `connect(onlyIfTrusted=false)`,
	/// `disconnect`, `request:disconnect`.
	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	pub fn count(&self, prefix: &str) -> usize {
		self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
	}

	pub fn is_connected(&self) -> bool {
		*self.connected.lock()
	}

	pub fn emit(&self, event: ProviderEvent) {
		self.listeners.lock().retain(|tx| tx.send(event.clone()).is_ok());
	}
}

#[async_trait(?Send)]
impl SolanaProvider for ScriptedSolanaProvider {
	async fn connect(&self, options: Option<ConnectOptions>) -> Result<Value> {
		let call = match options {
			Some(opts) => format!("connect(onlyIfTrusted={})", opts.only_if_trusted),
			None => "connect".to_string(),
		};
		self.calls.lock().push(call);

		if self.fixture.reject_connect {
			return Err(ProviderRpcError::user_rejected().into());
		}
		*self.connected.lock() = true;

		Ok(match (&self.fixture.connect_response, &self.fixture.public_key) {
			(Some(response), _) => response.clone(),
			(None, Some(key)) => json!({ "publicKey": key }),
			(None, None) => Value::Null,
		})
	}

	async fn disconnect(&self) -> Result<()> {
		self.calls.lock().push("disconnect".to_string());
		*self.connected.lock() = false;
		if self.fixture.fail_disconnect {
			return Err(Error::Unavailable("wallet is locked".into()));
		}
		Ok(())
	}

	fn supports_request(&self) -> bool {
		self.fixture.supports_request
	}

	async fn request(&self, args: RequestArguments) -> Result<Value> {
		if !self.fixture.supports_request {
			return Err(Error::Unsupported(format!("request({})", args.method)));
		}
		self.calls.lock().push(format!("request:{}", args.method));
		Ok(Value::Null)
	}

	fn public_key(&self) -> Option<String> {
		if self.fixture.expose_public_key && self.is_connected() {
			self.fixture.public_key.clone()
		} else {
			None
		}
	}

	fn subscribe(&self) -> Option<ProviderEvents> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.listeners.lock().push(tx);
		Some(rx)
	}
}
