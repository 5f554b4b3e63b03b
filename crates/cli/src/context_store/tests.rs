use std::fs;

use tempfile::TempDir;
use ww::{ChainChangePolicy, NetworkFamily};

use super::ContextState;
use crate::error::CliError;

#[test]
fn empty_dir_loads_defaults() {
	let tmp = TempDir::new().unwrap();
	let state = ContextState::load(Some(tmp.path())).unwrap();

	assert!(state.config().force_fresh_approval);
	assert_eq!(state.config().chain_change_policy, ChainChangePolicy::Disconnect);
	assert_eq!(state.preferences().marker(), None);
}

#[test]
fn config_file_overrides_defaults() {
	let tmp = TempDir::new().unwrap();
	fs::write(
		tmp.path().join("config.json"),
		r#"{ "forceFreshApproval": false, "chainChangePolicy": "follow", "deepLink": { "timeoutMs": 5000 } }"#,
	)
	.unwrap();

	let state = ContextState::load(Some(tmp.path())).unwrap();

	assert!(!state.config().force_fresh_approval);
	assert_eq!(state.config().chain_change_policy, ChainChangePolicy::Follow);
	assert_eq!(state.config().deep_link.timeout_ms, 5000);
	assert_eq!(state.config().deep_link.poll_interval_ms, 2000);
}

#[test]
fn broken_config_names_the_file() {
	let tmp = TempDir::new().unwrap();
	fs::write(tmp.path().join("config.json"), "[1, 2").unwrap();

	let err = ContextState::load(Some(tmp.path())).unwrap_err();

	match err {
		CliError::Config { path, .. } => assert!(path.ends_with("config.json")),
		other => panic!("expected config error, got {other:?}"),
	}
}

#[test]
fn no_fresh_flag_wins_over_config() {
	let tmp = TempDir::new().unwrap();
	let state = ContextState::load(Some(tmp.path())).unwrap();

	assert!(!state.effective_config(Some(false)).force_fresh_approval);
	assert!(state.effective_config(None).force_fresh_approval);
}

#[test]
fn preferences_persist_between_loads() {
	let tmp = TempDir::new().unwrap();
	{
		let state = ContextState::load(Some(tmp.path())).unwrap();
		state.preferences().remember(NetworkFamily::Evm, "metamask").unwrap();
		state.preferences().set_marker(NetworkFamily::Evm).unwrap();
	}

	let state = ContextState::load(Some(tmp.path())).unwrap();
	assert_eq!(state.preferences().preferred(NetworkFamily::Evm).as_deref(), Some("metamask"));
	assert_eq!(state.preferences().marker(), Some(NetworkFamily::Evm));
}
