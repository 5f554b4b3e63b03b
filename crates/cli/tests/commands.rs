//! Runs the `ww` binary against page fixtures and a throwaway state dir.

use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::{Value, json};
use tempfile::TempDir;

const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148";

struct Run {
	json: Value,
	success: bool,
	stderr: String,
}

fn write_page(dir: &Path, page: Value) -> std::path::PathBuf {
	let path = dir.join("page.json");
	std::fs::write(&path, page.to_string()).unwrap();
	path
}

fn ww(state: &Path, env: Option<&Path>, args: &[&str]) -> Run {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_ww"));
	cmd.arg("-f").arg("json").arg("--state-dir").arg(state);
	if let Some(env) = env {
		cmd.arg("--env").arg(env);
	}
	let output = cmd
		.args(args)
		.env_remove("RUST_LOG")
		.stdin(Stdio::null())
		.output()
		.expect("failed to execute ww");

	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	Run {
		json: serde_json::from_str(&stdout).unwrap_or_else(|_| json!({ "raw": stdout })),
		success: output.status.success(),
		stderr: String::from_utf8_lossy(&output.stderr).to_string(),
	}
}

fn two_evm_wallets() -> Value {
	json!({
		"ethereum": {
			"flags": ["isMetaMask"],
			"accounts": ["0xaaa"],
			"providers": [
				{ "flags": ["isCoinbaseWallet"], "accounts": ["0xccc"], "chainId": "0x2105" },
				{ "flags": ["isMetaMask"], "accounts": ["0xaaa"], "chainId": "0x2105" }
			]
		}
	})
}

#[test]
fn detect_lists_both_families() {
	let tmp = TempDir::new().unwrap();
	let page = write_page(
		tmp.path(),
		json!({
			"ethereum": { "flags": ["isMetaMask"], "accounts": ["0xabc"] },
			"solana": { "solana": { "flags": ["isPhantom"], "publicKey": "ABC123" } }
		}),
	);

	let run = ww(tmp.path(), Some(&page), &["detect"]);

	assert!(run.success, "stderr: {}", run.stderr);
	assert_eq!(run.json["ok"], true);
	assert_eq!(run.json["command"], "detect");
	let families = run.json["data"]["families"].as_array().unwrap();
	assert_eq!(families[0]["family"], "evm");
	assert_eq!(families[0]["providers"][0]["id"], "metamask");
	assert_eq!(families[1]["family"], "solana");
	assert_eq!(families[1]["providers"][0]["displayName"], "Phantom");
	assert_eq!(run.json["data"]["device"]["mobile"], false);
}

#[test]
fn detect_on_blocked_page_finds_nothing() {
	let tmp = TempDir::new().unwrap();
	let page = write_page(
		tmp.path(),
		json!({ "autoConnectBlocked": true, "ethereum": { "flags": ["isMetaMask"] } }),
	);

	let run = ww(tmp.path(), Some(&page), &["detect", "--family", "evm"]);

	assert_eq!(run.json["data"]["autoConnectBlocked"], true);
	assert_eq!(run.json["data"]["families"][0]["count"], 0);
}

#[test]
fn connect_solana_then_status_and_disconnect() {
	let tmp = TempDir::new().unwrap();
	let page = write_page(
		tmp.path(),
		json!({ "solana": { "solana": { "flags": ["isPhantom"], "publicKey": "ABC123" } } }),
	);

	let run = ww(tmp.path(), Some(&page), &["connect", "--family", "solana"]);
	assert!(run.success, "stderr: {}", run.stderr);
	let session = &run.json["data"]["session"];
	assert_eq!(session["status"], "connected");
	assert_eq!(session["account"], "ABC123");
	assert_eq!(session["provider"]["id"], "phantom");
	let types: Vec<&str> = run.json["data"]["events"]
		.as_array()
		.unwrap()
		.iter()
		.filter_map(|e| e["type"].as_str())
		.collect();
	assert_eq!(types, ["connecting", "connected"]);

	let status = ww(tmp.path(), None, &["status"]);
	assert_eq!(status.json["data"]["lastConnected"], "solana");

	let disconnect = ww(tmp.path(), None, &["disconnect"]);
	assert_eq!(disconnect.json["data"]["cleared"], "solana");

	let status = ww(tmp.path(), None, &["status"]);
	assert_eq!(status.json["data"]["lastConnected"], Value::Null);
}

#[test]
fn connect_evm_with_pick_and_remember() {
	let tmp = TempDir::new().unwrap();
	let page = write_page(tmp.path(), two_evm_wallets());

	let run = ww(
		tmp.path(),
		Some(&page),
		&["connect", "--family", "evm", "--pick", "coinbase", "--remember"],
	);

	assert!(run.success, "stderr: {}", run.stderr);
	assert_eq!(run.json["data"]["session"]["account"], "0xccc");
	assert_eq!(run.json["data"]["session"]["chain"], "eip155:8453");

	let prefs = ww(tmp.path(), None, &["prefs", "show"]);
	assert_eq!(prefs.json["command"], "prefs.show");
	assert_eq!(prefs.json["data"]["preferences"]["evm"], "coinbase");

	// the remembered wallet is used without asking
	let again = ww(tmp.path(), Some(&page), &["connect", "--family", "evm"]);
	assert!(again.success, "stderr: {}", again.stderr);
	assert_eq!(again.json["data"]["session"]["provider"]["id"], "coinbase");

	let cleared = ww(tmp.path(), None, &["prefs", "clear", "--family", "evm"]);
	assert_eq!(cleared.json["data"]["cleared"], json!(["evm"]));
	assert_eq!(cleared.json["data"]["preferences"], json!({}));
}

#[test]
fn several_wallets_without_a_terminal_cancel() {
	let tmp = TempDir::new().unwrap();
	let page = write_page(tmp.path(), two_evm_wallets());

	let run = ww(tmp.path(), Some(&page), &["connect", "--family", "evm"]);

	assert!(!run.success);
	assert_eq!(run.json["ok"], false);
	assert_eq!(run.json["command"], "connect");
	assert_eq!(run.json["error"]["code"], "SELECTION_CANCELLED");
	assert_eq!(run.json["error"]["message"], "Connection was cancelled.");
}

#[test]
fn missing_wallet_reports_install_hint() {
	let tmp = TempDir::new().unwrap();
	let page = write_page(tmp.path(), json!({}));

	let run = ww(tmp.path(), Some(&page), &["connect", "--family", "solana"]);

	assert!(!run.success);
	assert_eq!(run.json["error"]["code"], "NO_PROVIDER_FOUND");
	assert_eq!(
		run.json["error"]["message"],
		"Connection failed. Please install a Solana wallet like Phantom or Solflare."
	);
	assert_eq!(run.json["error"]["details"]["family"], "solana");
}

#[test]
fn mobile_without_wallet_includes_guidance() {
	let tmp = TempDir::new().unwrap();
	let page = write_page(
		tmp.path(),
		json!({ "userAgent": IPHONE, "pageUrl": "https://wildwest.example/" }),
	);

	let run = ww(tmp.path(), Some(&page), &["connect", "--family", "solana"]);

	assert_eq!(run.json["error"]["code"], "NO_PROVIDER_FOUND");
	let events = run.json["error"]["details"]["events"].as_array().unwrap();
	let guidance = events
		.iter()
		.find(|e| e["type"] == "install_guidance")
		.expect("guidance event");
	assert_eq!(guidance["wallets"][0]["name"], "Phantom");
	assert!(
		guidance["wallets"][0]["deepLink"]
			.as_str()
			.unwrap()
			.starts_with("phantom://")
	);
}

#[test]
fn rejected_switch_keeps_no_marker() {
	let tmp = TempDir::new().unwrap();
	let page = write_page(
		tmp.path(),
		json!({
			"ethereum": {
				"flags": ["isMetaMask"],
				"accounts": ["0xabc"],
				"switchError": { "code": 4001, "message": "User rejected the request." }
			}
		}),
	);

	let run = ww(tmp.path(), Some(&page), &["connect", "--family", "evm"]);

	assert_eq!(run.json["error"]["code"], "CHAIN_SWITCH_REJECTED");
	assert_eq!(run.json["error"]["details"]["providerCode"], 4001);
	let status = ww(tmp.path(), None, &["status"]);
	assert_eq!(status.json["data"]["lastConnected"], Value::Null);
}

#[test]
fn invalid_page_file_is_invalid_input() {
	let tmp = TempDir::new().unwrap();
	let page = tmp.path().join("page.json");
	std::fs::write(&page, "{ \"ethereum\": 12 }").unwrap();

	let run = ww(tmp.path(), Some(&page), &["detect"]);

	assert!(!run.success);
	assert_eq!(run.json["error"]["code"], "INVALID_INPUT");
	assert!(run.stderr.contains("INVALID_INPUT"));
}

#[test]
fn broken_config_is_config_error() {
	let tmp = TempDir::new().unwrap();
	std::fs::write(tmp.path().join("config.json"), "not json").unwrap();

	let run = ww(tmp.path(), None, &["status"]);

	assert_eq!(run.json["ok"], false);
	assert_eq!(run.json["command"], "status");
	assert_eq!(run.json["error"]["code"], "CONFIG_ERROR");
}
