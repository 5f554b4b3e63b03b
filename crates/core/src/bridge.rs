//! Mobile deep-link round trip.
//!
//! On a phone with no injected wallet, the page hands off to the wallet app
//! through a deep link. The app reopens the page in its own browser, where
//! the provider shows up. [`DeepLinkBridge::await_provider`] polls the
//! registry for that, bounded by a timeout and cancellable.

use std::rc::Rc;

use tokio::sync::watch;
use ww_protocol::NetworkFamily;
use ww_runtime::{Launcher, Timer};

use crate::config::DeepLinkConfig;
use crate::deeplink::WalletLinks;
use crate::error::{ConnectError, Result};
use crate::registry::{ProviderDescriptor, ProviderRegistry};

/// Creates a linked cancel handle and token.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
	let (tx, rx) = watch::channel(false);
	(CancelHandle { tx }, CancelToken { rx })
}

/// Cancels every [`CancelToken`] made with it.
#[derive(Debug)]
pub struct CancelHandle {
	tx: watch::Sender<bool>,
}

impl CancelHandle {
	pub fn cancel(&self) {
		self.tx.send_replace(true);
	}
}

#[derive(Debug, Clone)]
pub struct CancelToken {
	rx: watch::Receiver<bool>,
}

impl CancelToken {
	pub fn is_cancelled(&self) -> bool {
		*self.rx.borrow()
	}

	/// Resolves once cancelled. Never resolves if the handle is dropped
	/// without cancelling.
	pub async fn cancelled(&self) {
		let mut rx = self.rx.clone();
		loop {
			if *rx.borrow_and_update() {
				return;
			}
			if rx.changed().await.is_err() {
				std::future::pending::<()>().await;
			}
		}
	}
}

pub struct DeepLinkBridge {
	launcher: Rc<dyn Launcher>,
	timer: Rc<dyn Timer>,
	config: DeepLinkConfig,
}

impl DeepLinkBridge {
	pub fn new(launcher: Rc<dyn Launcher>, timer: Rc<dyn Timer>, config: DeepLinkConfig) -> Self {
		Self {
			launcher,
			timer,
			config,
		}
	}

	/// Opens the wallet app, preferring its custom-scheme deep link over the
	/// universal link. Returns the URL that was opened.
	pub fn open(&self, links: &WalletLinks) -> Result<String> {
		let url = links
			.deep_link
			.as_ref()
			.or(links.universal_link.as_ref())
			.ok_or_else(|| ConnectError::ProviderFailure {
				code: None,
				message: format!("{} has no link for this page", links.name),
			})?;
		tracing::info!(target = "ww.bridge", wallet = %links.wallet, url = %url, "opening wallet app");
		self.launcher.open(url).map_err(ConnectError::from_provider)?;
		Ok(url.clone())
	}

	/// Re-enumerates `family` every poll interval until a wallet appears.
	///
	/// Fails with [`ConnectError::DeepLinkTimeout`] once the configured
	/// timeout has elapsed and with [`ConnectError::SelectionCancelled`] when
	/// `token` fires first.
	pub async fn await_provider(
		&self,
		registry: &ProviderRegistry,
		family: NetworkFamily,
		token: &CancelToken,
	) -> Result<Vec<ProviderDescriptor>> {
		let interval = self.config.poll_interval();
		let timeout = self.config.timeout();
		let mut waited = std::time::Duration::ZERO;

		loop {
			if token.is_cancelled() {
				return Err(ConnectError::SelectionCancelled);
			}
			let found = registry.enumerate(family);
			if !found.is_empty() {
				tracing::info!(target = "ww.bridge", %family, count = found.len(), ?waited, "provider appeared");
				return Ok(found);
			}
			if waited >= timeout {
				tracing::warn!(target = "ww.bridge", %family, ?timeout, "gave up waiting for wallet app");
				return Err(ConnectError::DeepLinkTimeout {
					timeout_ms: self.config.timeout_ms,
				});
			}

			tokio::select! {
				_ = self.timer.sleep(interval) => {}
				_ = token.cancelled() => {
					tracing::debug!(target = "ww.bridge", %family, "deep link wait cancelled");
					return Err(ConnectError::SelectionCancelled);
				}
			}
			waited += interval;
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use ww_runtime::TokioTimer;
	use ww_runtime::scripted::{EthereumFixture, EvmWalletFixture, RecordingLauncher, ScriptedEnvironment};
	use ww_runtime::scripted::EnvironmentFixture;

	use super::*;
	use crate::device::DeviceProfile;
	use crate::wallet::WalletKind;

	fn bridge(launcher: Rc<RecordingLauncher>) -> DeepLinkBridge {
		DeepLinkBridge::new(launcher, Rc::new(TokioTimer), DeepLinkConfig::default())
	}

	fn metamask_links() -> WalletLinks {
		let device = DeviceProfile {
			mobile: true,
			ios: true,
			..Default::default()
		};
		WalletLinks::new(WalletKind::MetaMask, Some("https://wildwest.example/"), &device)
	}

	#[test]
	fn open_prefers_deep_link() {
		let launcher = Rc::new(RecordingLauncher::new());
		let url = bridge(launcher.clone()).open(&metamask_links()).unwrap();
		assert_eq!(url, "metamask://dapp/wildwest.example");
		assert_eq!(launcher.opened(), vec![url]);
	}

	#[test]
	fn open_surfaces_launcher_failure() {
		let err = bridge(Rc::new(RecordingLauncher::failing())).open(&metamask_links()).unwrap_err();
		assert!(matches!(err, ConnectError::ProviderFailure { .. }));
	}

	#[tokio::test(start_paused = true)]
	async fn times_out_when_nothing_appears() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default()));
		let registry = ProviderRegistry::new(env);
		let (_handle, token) = cancel_pair();

		let start = tokio::time::Instant::now();
		let err = bridge(Rc::new(RecordingLauncher::new()))
			.await_provider(&registry, NetworkFamily::Evm, &token)
			.await
			.unwrap_err();
		assert_eq!(err, ConnectError::DeepLinkTimeout { timeout_ms: 30_000 });
		assert!(start.elapsed() >= Duration::from_secs(30));
	}

	/// Returns at once and counts how often it was asked to sleep.
	#[derive(Default)]
	struct CountingTimer {
		sleeps: std::cell::Cell<usize>,
	}

	#[async_trait::async_trait(?Send)]
	impl Timer for CountingTimer {
		async fn sleep(&self, _duration: Duration) {
			self.sleeps.set(self.sleeps.get() + 1);
		}
	}

	#[tokio::test]
	async fn zero_poll_interval_still_times_out() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default()));
		let registry = ProviderRegistry::new(env);
		let (_handle, token) = cancel_pair();
		let timer = Rc::new(CountingTimer::default());
		let config = DeepLinkConfig {
			enabled: true,
			poll_interval_ms: 0,
			timeout_ms: 1_000,
		};
		let bridge = DeepLinkBridge::new(Rc::new(RecordingLauncher::new()), timer.clone(), config);

		let err = bridge
			.await_provider(&registry, NetworkFamily::Solana, &token)
			.await
			.unwrap_err();
		assert_eq!(err, ConnectError::DeepLinkTimeout { timeout_ms: 1_000 });
		assert_eq!(timer.sleeps.get(), 10);
	}

	#[tokio::test(start_paused = true)]
	async fn resolves_when_wallet_injects() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default()));
		let registry = ProviderRegistry::new(env.clone());
		let (_handle, token) = cancel_pair();
		let bridge = bridge(Rc::new(RecordingLauncher::new()));

		let inject = async {
			tokio::time::sleep(Duration::from_secs(5)).await;
			env.inject_ethereum(EthereumFixture {
				root: EvmWalletFixture::new(&["isMetaMask"]),
				providers: None,
			});
		};
		let (found, ()) = tokio::join!(bridge.await_provider(&registry, NetworkFamily::Evm, &token), inject);
		let found = found.unwrap();
		assert_eq!(found[0].id, "metamask");
	}

	#[tokio::test(start_paused = true)]
	async fn cancel_stops_the_wait() {
		let env = Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default()));
		let registry = ProviderRegistry::new(env);
		let (handle, token) = cancel_pair();
		let bridge = bridge(Rc::new(RecordingLauncher::new()));

		let cancel = async {
			tokio::time::sleep(Duration::from_secs(3)).await;
			handle.cancel();
		};
		let start = tokio::time::Instant::now();
		let (result, ()) = tokio::join!(bridge.await_provider(&registry, NetworkFamily::Evm, &token), cancel);
		assert_eq!(result.unwrap_err(), ConnectError::SelectionCancelled);
		assert!(start.elapsed() < Duration::from_secs(30));
	}
}
