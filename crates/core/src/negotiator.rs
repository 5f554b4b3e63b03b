//! Handshake with a selected provider.

use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;
use ww_protocol::{ChainRef, ConnectOptions, ConnectResponse, RequestArguments};
use ww_runtime::{Eip1193Provider, ProviderHandle, SolanaProvider, Timer};

use crate::chain_switch::ChainSwitchProtocol;
use crate::error::{ConnectError, Result};
use crate::registry::ProviderDescriptor;

/// Outcome of a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
	/// Hex address (EVM) or base58 public key (Solana).
	pub account: String,
	pub chain: ChainRef,
}

pub struct ConnectionNegotiator {
	chain_switch: ChainSwitchProtocol,
	timer: Rc<dyn Timer>,
	force_fresh_approval: bool,
	fresh_settle: Duration,
}

impl ConnectionNegotiator {
	pub fn new(chain_switch: ChainSwitchProtocol, timer: Rc<dyn Timer>) -> Self {
		Self {
			chain_switch,
			timer,
			force_fresh_approval: false,
			fresh_settle: Duration::ZERO,
		}
	}

	/// Revoke existing trust before every Solana connect, waiting `settle`
	/// between the revoke and the connect.
	pub fn with_fresh_approval(mut self, enabled: bool, settle: Duration) -> Self {
		self.force_fresh_approval = enabled;
		self.fresh_settle = settle;
		self
	}

	pub async fn negotiate(&self, descriptor: &ProviderDescriptor) -> Result<Negotiated> {
		tracing::debug!(target = "ww.negotiator", id = %descriptor.id, "starting handshake");
		match &descriptor.handle {
			ProviderHandle::Evm(provider) => self.negotiate_evm(provider.as_ref()).await,
			ProviderHandle::Solana(provider) => self.negotiate_solana(provider.as_ref()).await,
		}
	}

	async fn negotiate_evm(&self, provider: &dyn Eip1193Provider) -> Result<Negotiated> {
		let response = provider
			.request(RequestArguments::request_accounts())
			.await
			.map_err(ConnectError::from_provider)?;
		let account = first_account(&response)?;
		tracing::debug!(target = "ww.negotiator", account = %account, "accounts approved");

		let chain = self.chain_switch.ensure_chain(provider).await?;
		Ok(Negotiated {
			account,
			chain: ChainRef::Evm(chain),
		})
	}

	async fn negotiate_solana(&self, provider: &dyn SolanaProvider) -> Result<Negotiated> {
		let options = if self.force_fresh_approval {
			self.revoke_trust(provider).await;
			Some(ConnectOptions::prompt())
		} else {
			None
		};

		let response = provider.connect(options).await.map_err(ConnectError::from_provider)?;
		// the resolved value first, then the adapter's own publicKey
		let account = match ConnectResponse::classify(&response) {
			ConnectResponse::WithPublicKey(key) => key,
			ConnectResponse::Acknowledged => provider.public_key().ok_or(ConnectError::NoPublicKeyFound)?,
			ConnectResponse::Unsupported(shape) => {
				tracing::debug!(target = "ww.negotiator", shape = %shape, "falling back to adapter publicKey");
				provider
					.public_key()
					.ok_or(ConnectError::UnsupportedResponseShape { shape })?
			}
		};
		tracing::debug!(target = "ww.negotiator", account = %account, "solana wallet approved");

		Ok(Negotiated {
			account,
			chain: ChainRef::Solana,
		})
	}

	/// Best effort: failures are logged and the connect proceeds.
	async fn revoke_trust(&self, provider: &dyn SolanaProvider) {
		if let Err(err) = provider.disconnect().await {
			tracing::debug!(target = "ww.negotiator", error = %err, "pre-connect disconnect failed");
		}
		if provider.supports_request() {
			if let Err(err) = provider.request(RequestArguments::disconnect()).await {
				tracing::debug!(target = "ww.negotiator", error = %err, "pre-connect revoke request failed");
			}
		}
		if !self.fresh_settle.is_zero() {
			self.timer.sleep(self.fresh_settle).await;
		}
	}
}

fn first_account(response: &Value) -> Result<String> {
	let accounts = response.as_array().ok_or_else(|| ConnectError::UnsupportedResponseShape {
		shape: "eth_requestAccounts did not return an array".to_string(),
	})?;
	match accounts.first() {
		None => Err(ConnectError::NoAccountsReturned),
		Some(Value::String(account)) => Ok(account.clone()),
		Some(_) => Err(ConnectError::UnsupportedResponseShape {
			shape: "account entry is not a string".to_string(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use ww_protocol::{AddChainParameter, ChainId, NetworkFamily, methods};
	use ww_runtime::TokioTimer;
	use ww_runtime::scripted::{
		EnvironmentFixture, EvmWalletFixture, ScriptedEnvironment, SolanaWalletFixture,
	};
	use ww_runtime::SolanaNamespace;

	use super::*;
	use crate::chain_switch::StaticEndpoints;
	use crate::registry::ProviderRegistry;

	fn negotiator(fresh: bool) -> ConnectionNegotiator {
		let switch = ChainSwitchProtocol::new(AddChainParameter::base(), Rc::new(StaticEndpoints::default()));
		ConnectionNegotiator::new(switch, Rc::new(TokioTimer)).with_fresh_approval(fresh, Duration::from_millis(500))
	}

	fn only(env: &Rc<ScriptedEnvironment>, family: NetworkFamily) -> ProviderDescriptor {
		let mut list = ProviderRegistry::new(env.clone()).enumerate(family);
		assert_eq!(list.len(), 1);
		list.remove(0)
	}

	#[test]
	fn first_account_shapes() {
		assert_eq!(first_account(&json!(["0xabc", "0xdef"])), Ok("0xabc".to_string()));
		assert_eq!(first_account(&json!([])), Err(ConnectError::NoAccountsReturned));
		assert!(matches!(
			first_account(&json!({ "accounts": [] })),
			Err(ConnectError::UnsupportedResponseShape { .. })
		));
		assert!(matches!(first_account(&json!([1])), Err(ConnectError::UnsupportedResponseShape { .. })));
	}

	#[tokio::test]
	async fn evm_handshake_switches_chain() {
		let env = Rc::new(ScriptedEnvironment::new(
			EnvironmentFixture::default()
				.with_ethereum(EvmWalletFixture::new(&["isMetaMask"]).with_accounts(&["0xAbC"]).knows(ChainId::BASE)),
		));
		let result = negotiator(true).negotiate(&only(&env, NetworkFamily::Evm)).await.unwrap();
		assert_eq!(
			result,
			Negotiated {
				account: "0xAbC".into(),
				chain: ChainRef::Evm(ChainId::BASE)
			}
		);
		assert_eq!(
			env.evm_root().unwrap().call_methods(),
			vec![methods::REQUEST_ACCOUNTS, methods::SWITCH_CHAIN]
		);
	}

	#[tokio::test]
	async fn evm_rejection_skips_chain_switch() {
		let env = Rc::new(ScriptedEnvironment::new(
			EnvironmentFixture::default().with_ethereum(EvmWalletFixture::new(&[]).rejecting_accounts()),
		));
		let err = negotiator(false).negotiate(&only(&env, NetworkFamily::Evm)).await.unwrap_err();
		assert!(matches!(err, ConnectError::UserRejected { .. }));
		assert_eq!(env.evm_root().unwrap().count(methods::SWITCH_CHAIN), 0);
	}

	#[tokio::test]
	async fn evm_empty_accounts() {
		let env = Rc::new(ScriptedEnvironment::new(
			EnvironmentFixture::default().with_ethereum(EvmWalletFixture::new(&[])),
		));
		let err = negotiator(false).negotiate(&only(&env, NetworkFamily::Evm)).await.unwrap_err();
		assert_eq!(err, ConnectError::NoAccountsReturned);
	}

	#[tokio::test(start_paused = true)]
	async fn solana_fresh_approval_revokes_then_connects() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default().with_solana(
			SolanaNamespace::Solana,
			SolanaWalletFixture::new(&["isPhantom"], "PhantomKey").with_request(),
		)));
		let result = negotiator(true).negotiate(&only(&env, NetworkFamily::Solana)).await.unwrap();
		assert_eq!(result.account, "PhantomKey");
		assert_eq!(result.chain, ChainRef::Solana);
		assert_eq!(
			env.solana_provider(SolanaNamespace::Solana).unwrap().calls(),
			vec!["disconnect", "request:disconnect", "connect(onlyIfTrusted=false)"]
		);
	}

	#[tokio::test]
	async fn solana_revoke_failures_are_ignored() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default().with_solana(
			SolanaNamespace::Solflare,
			SolanaWalletFixture::new(&["isSolflare"], "SolKey").failing_disconnect(),
		)));
		let result = negotiator(true).negotiate(&only(&env, NetworkFamily::Solana)).await;
		assert_eq!(result.map(|n| n.account), Ok("SolKey".to_string()));
	}

	#[tokio::test]
	async fn solana_acknowledged_reads_handle_key() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default().with_solana(
			SolanaNamespace::Glow,
			SolanaWalletFixture::new(&["isGlow"], "GlowKey").responding(json!(true)),
		)));
		let result = negotiator(false).negotiate(&only(&env, NetworkFamily::Solana)).await.unwrap();
		assert_eq!(result.account, "GlowKey");
		assert_eq!(env.solana_provider(SolanaNamespace::Glow).unwrap().calls(), vec!["connect"]);
	}

	#[tokio::test]
	async fn solana_acknowledged_without_key() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default().with_solana(
			SolanaNamespace::Backpack,
			SolanaWalletFixture::new(&["isBackpack"], "Hidden")
				.responding(Value::Null)
				.hiding_public_key(),
		)));
		let err = negotiator(false).negotiate(&only(&env, NetworkFamily::Solana)).await.unwrap_err();
		assert_eq!(err, ConnectError::NoPublicKeyFound);
	}

	#[tokio::test]
	async fn solana_other_shapes_fall_back_to_handle_key() {
		for response in [json!({}), json!(false), json!("connected"), json!({ "publicKey": 12 })] {
			let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default().with_solana(
				SolanaNamespace::Solflare,
				SolanaWalletFixture::new(&["isSolflare"], "HandleKey").responding(response.clone()),
			)));
			let result = negotiator(false).negotiate(&only(&env, NetworkFamily::Solana)).await;
			assert_eq!(result.map(|n| n.account), Ok("HandleKey".to_string()), "{response}");
		}
	}

	#[tokio::test]
	async fn solana_no_key_anywhere() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default().with_solana(
			SolanaNamespace::Solflare,
			SolanaWalletFixture::new(&[], "K")
				.responding(json!({ "ok": true }))
				.hiding_public_key(),
		)));
		let err = negotiator(false).negotiate(&only(&env, NetworkFamily::Solana)).await.unwrap_err();
		assert_eq!(err, ConnectError::NoPublicKeyFound);
	}

	#[tokio::test]
	async fn solana_malformed_key_without_handle_key() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default().with_solana(
			SolanaNamespace::Solflare,
			SolanaWalletFixture::new(&[], "K")
				.responding(json!({ "publicKey": 12 }))
				.hiding_public_key(),
		)));
		let err = negotiator(false).negotiate(&only(&env, NetworkFamily::Solana)).await.unwrap_err();
		assert!(matches!(err, ConnectError::UnsupportedResponseShape { .. }));
	}
}
