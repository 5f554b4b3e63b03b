//! End-to-end connect flows against scripted pages.

use std::rc::Rc;

use serde_json::json;
use ww::{ChainId, ChainRef, ConnectError, NetworkFamily, SessionStatus, WalletConfig, WalletService};
use ww_protocol::{ProviderRpcError, methods};
use ww_runtime::scripted::ScriptedEnvironment;
use ww_runtime::{SolanaNamespace, TokioTimer};

fn service(page: serde_json::Value) -> (WalletService, Rc<ScriptedEnvironment>) {
	let env = Rc::new(ScriptedEnvironment::from_json(&page.to_string()).expect("valid fixture"));
	let service = WalletService::builder(env.clone(), Rc::new(TokioTimer))
		.config(WalletConfig::default().with_force_fresh_approval(false))
		.build();
	(service, env)
}

#[tokio::test]
async fn no_wallet_on_desktop_is_no_provider_found() {
	let (service, _) = service(json!({}));

	let err = service.try_connect(Some(NetworkFamily::Solana)).await.unwrap_err();

	assert_eq!(
		err,
		ConnectError::NoProviderFound {
			family: NetworkFamily::Solana
		}
	);
	assert_eq!(service.status(), SessionStatus::Disconnected);
	assert!(!service.is_connected());
}

#[tokio::test]
async fn phantom_returning_public_key_object() {
	let (service, _) = service(json!({
		"solana": { "solana": { "flags": ["isPhantom"], "publicKey": "ABC123" } }
	}));

	assert!(service.connect(Some(NetworkFamily::Solana)).await);

	assert_eq!(service.status(), SessionStatus::Connected);
	assert_eq!(service.current_account().as_deref(), Some("ABC123"));
}

#[tokio::test]
async fn phantom_returning_true_then_exposing_key() {
	let (service, env) = service(json!({
		"solana": {
			"solana": { "flags": ["isPhantom"], "publicKey": "XYZ789", "connectResponse": true }
		}
	}));

	assert!(service.connect(Some(NetworkFamily::Solana)).await);

	assert_eq!(service.current_account().as_deref(), Some("XYZ789"));
	assert_eq!(
		env.solana_provider(SolanaNamespace::Solana).unwrap().calls(),
		vec!["connect"]
	);
}

#[tokio::test]
async fn evm_unknown_chain_is_added_then_connected() {
	let (service, env) = service(json!({
		"ethereum": { "flags": ["isMetaMask"], "accounts": ["0xabc"], "chainId": "0x1" }
	}));

	assert!(service.connect(Some(NetworkFamily::Evm)).await);

	assert_eq!(service.current_account().as_deref(), Some("0xabc"));
	assert_eq!(service.current_chain(), Some(ChainRef::Evm(ChainId::BASE)));
	let wallet = env.evm_root().unwrap();
	assert_eq!(
		wallet.call_methods(),
		vec![methods::REQUEST_ACCOUNTS, methods::SWITCH_CHAIN, methods::ADD_CHAIN]
	);
}

#[tokio::test]
async fn evm_switch_rejected_outright_stays_disconnected() {
	let (service, env) = service(json!({
		"ethereum": {
			"flags": ["isMetaMask"],
			"accounts": ["0xabc"],
			"switchError": { "code": 4001, "message": "User rejected the request." }
		}
	}));

	let err = service.try_connect(Some(NetworkFamily::Evm)).await.unwrap_err();

	assert!(matches!(err, ConnectError::ChainSwitchRejected { code: Some(4001), .. }));
	assert_eq!(service.status(), SessionStatus::Disconnected);
	assert_eq!(service.current_account(), None);
	assert_eq!(env.evm_root().unwrap().count(methods::ADD_CHAIN), 0);
}

#[tokio::test]
async fn failed_add_is_attempted_exactly_once() {
	let (service, env) = service(json!({
		"ethereum": {
			"flags": ["isCoinbaseWallet"],
			"accounts": ["0xabc"],
			"addError": ProviderRpcError::new(-32603, "could not add chain")
		}
	}));

	let err = service.try_connect(Some(NetworkFamily::Evm)).await.unwrap_err();

	assert!(matches!(err, ConnectError::ChainAddRejected { .. }));
	let wallet = env.evm_root().unwrap();
	assert_eq!(wallet.count(methods::SWITCH_CHAIN), 1);
	assert_eq!(wallet.count(methods::ADD_CHAIN), 1);
}

#[tokio::test]
async fn blocked_page_never_touches_wallets() {
	let (service, env) = service(json!({
		"autoConnectBlocked": true,
		"ethereum": { "flags": ["isMetaMask"], "accounts": ["0xabc"] }
	}));

	assert!(service.detect(NetworkFamily::Evm).is_empty());
	assert!(!service.connect(Some(NetworkFamily::Evm)).await);
	assert!(env.evm_root().unwrap().calls().is_empty());
}
