//! The connection state machine.
//!
//! [`WalletService`] owns the one [`ConnectionSession`] and is the only
//! thing that mutates it. A connect runs registry, selector, negotiator and
//! (for EVM) the chain switch, then commits:
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!                               `--error/cancel--> Disconnected
//! Connected --disconnect / accounts removed / chain left--> Disconnected
//! ```
//!
//! Connects are serialized by a fair async mutex: a second caller waits in
//! FIFO order and runs once the first resolves. Every transition bumps a
//! generation counter so that a handshake finishing after a `disconnect()`
//! cannot resurrect the session.

mod builder;

use std::rc::Rc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use ww_protocol::{ChainRef, NetworkFamily, ProviderEvent};
use ww_runtime::ProviderHandle;

pub use self::builder::WalletServiceBuilder;
use crate::bridge::{CancelHandle, DeepLinkBridge, cancel_pair};
use crate::config::{ChainChangePolicy, WalletConfig};
use crate::deeplink::WalletLinks;
use crate::device::DeviceProfile;
use crate::error::{ConnectError, Result};
use crate::events::{DisconnectReason, EventStream, SessionEvent};
use crate::negotiator::{ConnectionNegotiator, Negotiated};
use crate::notify::{Notifier, Severity};
use crate::preferences::PreferenceStore;
use crate::prompt::SelectionPrompt;
use crate::registry::{ProviderDescriptor, ProviderRegistry};
use crate::selector::{Selection, WalletSelector};
use crate::session::{Binding, ConnectionSession, SessionSnapshot, SessionStatus};
use crate::wallet::WalletKind;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct State {
	session: ConnectionSession,
	generation: u64,
	queued: usize,
}

/// A place in the connect queue. Released on drop, so a caller that gives
/// up while waiting does not inflate later `Queued` counts.
struct QueueSlot<'a> {
	state: &'a Mutex<State>,
	waiting: usize,
}

impl<'a> QueueSlot<'a> {
	fn take(state: &'a Mutex<State>) -> Self {
		let waiting = {
			let mut state = state.lock();
			state.queued += 1;
			state.queued
		};
		Self { state, waiting }
	}
}

impl Drop for QueueSlot<'_> {
	fn drop(&mut self) {
		self.state.lock().queued -= 1;
	}
}

pub struct WalletService {
	registry: ProviderRegistry,
	selector: WalletSelector,
	negotiator: ConnectionNegotiator,
	preferences: PreferenceStore,
	prompt: Rc<dyn SelectionPrompt>,
	notifier: Rc<dyn Notifier>,
	bridge: Option<DeepLinkBridge>,
	config: WalletConfig,
	state: Mutex<State>,
	connect_lock: tokio::sync::Mutex<()>,
	pending: Mutex<Option<CancelHandle>>,
	events: broadcast::Sender<SessionEvent>,
	remembered_family: Option<NetworkFamily>,
}

impl WalletService {
	pub fn builder(
		env: Rc<dyn ww_runtime::Environment>,
		timer: Rc<dyn ww_runtime::Timer>,
	) -> WalletServiceBuilder {
		WalletServiceBuilder::new(env, timer)
	}

	/// Connects to a wallet of `family`, prompting for the family first when
	/// it is `None`. Returns whether a session is live afterwards.
	///
	/// Failures are reported through the notifier and the event stream;
	/// use [`try_connect`](Self::try_connect) to get them as values.
	pub async fn connect(&self, family: Option<NetworkFamily>) -> bool {
		self.try_connect(family).await.is_ok()
	}

	pub async fn try_connect(&self, family: Option<NetworkFamily>) -> Result<SessionSnapshot> {
		let _guard = match self.connect_lock.try_lock() {
			Ok(guard) => guard,
			Err(_) => {
				let slot = QueueSlot::take(&self.state);
				tracing::info!(target = "ww.session", waiting = slot.waiting, "connection already in progress; queued");
				self.emit(SessionEvent::Queued { waiting: slot.waiting });
				let guard = self.connect_lock.lock().await;
				drop(slot);
				guard
			}
		};

		let family = match family {
			Some(family) => family,
			None => {
				if let Some(snapshot) = self.live_snapshot(None) {
					return Ok(snapshot);
				}
				match self.prompt.choose_family(self.suggested_family()).await {
					Some(family) => family,
					None => {
						let err = ConnectError::SelectionCancelled;
						self.report(&err);
						return Err(err);
					}
				}
			}
		};

		if let Some(snapshot) = self.live_snapshot(Some(family)) {
			tracing::debug!(target = "ww.session", %family, "already connected");
			return Ok(snapshot);
		}
		if self.is_connected() {
			self.end_session(DisconnectReason::Replaced);
		}

		let generation = {
			let mut state = self.state.lock();
			state.generation += 1;
			state.session.begin();
			state.generation
		};
		tracing::info!(target = "ww.session", %family, "connecting");
		self.emit(SessionEvent::Connecting { family });

		let attempt = self.attempt(family).await;
		match attempt {
			Ok((descriptor, negotiated)) => self.commit(generation, family, descriptor, negotiated),
			Err(err) => {
				self.fail(generation, &err);
				Err(err)
			}
		}
	}

	async fn attempt(&self, family: NetworkFamily) -> Result<(ProviderDescriptor, Negotiated)> {
		let device = self.registry.device();
		let mut candidates = self.registry.enumerate(family);
		if candidates.is_empty() && device.mobile && !self.registry.environment().auto_connect_blocked() {
			candidates = self.install_guidance(family, &device).await?;
		}

		let remembered = self.preferences.preferred(family);
		match self.selector.select(family, candidates, remembered.as_deref(), &device).await? {
			Selection::Cancelled => Err(ConnectError::SelectionCancelled),
			Selection::Selected { descriptor, reason } => {
				tracing::info!(target = "ww.session", id = %descriptor.id, ?reason, "wallet selected");
				let negotiated = self.negotiator.negotiate(&descriptor).await?;
				Ok((descriptor, negotiated))
			}
		}
	}

	/// Emits install links and, when a launcher is configured, hands off to
	/// the preferred wallet app and waits for it to inject a provider.
	async fn install_guidance(&self, family: NetworkFamily, device: &DeviceProfile) -> Result<Vec<ProviderDescriptor>> {
		let page_url = self.registry.page_url();
		let wallets: Vec<WalletLinks> = WalletKind::recommended(family)
			.iter()
			.map(|kind| WalletLinks::new(*kind, page_url.as_deref(), device))
			.collect();
		self.emit(SessionEvent::InstallGuidance {
			family,
			wallets: wallets.clone(),
		});

		let Some(bridge) = &self.bridge else {
			return Ok(Vec::new());
		};
		if !self.config.deep_link.enabled {
			return Ok(Vec::new());
		}

		let preferred = self
			.preferences
			.preferred(family)
			.and_then(|id| WalletKind::from_id(&id));
		let Some(links) = wallets
			.iter()
			.find(|links| Some(links.wallet) == preferred && links.deep_link.is_some())
			.or_else(|| wallets.iter().find(|links| links.deep_link.is_some()))
		else {
			return Ok(Vec::new());
		};

		if let Err(err) = bridge.open(links) {
			tracing::warn!(target = "ww.session", error = %err, "could not open wallet app");
			return Ok(Vec::new());
		}

		let (handle, token) = cancel_pair();
		*self.pending.lock() = Some(handle);
		let found = bridge.await_provider(&self.registry, family, &token).await;
		self.pending.lock().take();
		found
	}

	fn commit(
		&self,
		generation: u64,
		family: NetworkFamily,
		descriptor: ProviderDescriptor,
		negotiated: Negotiated,
	) -> Result<SessionSnapshot> {
		let provider_name = descriptor.display_name.clone();
		let snapshot = {
			let mut state = self.state.lock();
			if state.generation != generation {
				drop(state);
				tracing::info!(target = "ww.session", %family, "session was reset during the handshake; discarding");
				let err = ConnectError::SelectionCancelled;
				self.fail(generation, &err);
				return Err(err);
			}
			state.session.establish(Binding {
				account: negotiated.account,
				family,
				chain: negotiated.chain,
				provider: descriptor,
			});
			state.session.snapshot()
		};

		if let Err(err) = self.preferences.set_marker(family) {
			tracing::warn!(target = "ww.session", error = %err, "failed to persist connection marker");
		}
		tracing::info!(
			target = "ww.session",
			%family,
			account = snapshot.account.as_deref().unwrap_or_default(),
			chain = snapshot.chain_name.as_deref().unwrap_or_default(),
			"connected"
		);
		self.emit(SessionEvent::Connected {
			session: snapshot.clone(),
		});
		self.notifier.notify(
			&format!("{} wallet connected via {provider_name}", family.label()),
			Severity::Success,
		);
		Ok(snapshot)
	}

	fn fail(&self, generation: u64, err: &ConnectError) {
		{
			let mut state = self.state.lock();
			if state.generation == generation {
				state.generation += 1;
				state.session.reset();
			}
		}
		self.emit(SessionEvent::ConnectFailed {
			code: err.code(),
			message: err.user_message(),
		});
		self.report(err);
	}

	fn report(&self, err: &ConnectError) {
		if err.is_benign() {
			tracing::info!(target = "ww.session", code = err.code(), reason = %err, "connection cancelled");
			self.notifier.notify(&err.user_message(), Severity::Info);
		} else {
			tracing::error!(target = "ww.session", code = err.code(), error = ?err, "wallet connection failed: {err}");
			self.notifier.notify(&err.user_message(), Severity::Error);
		}
	}

	/// Ends the session. A no-op when already disconnected.
	pub async fn disconnect(&self) {
		self.cancel_pending();
		let Some((dropped, _)) = self.reset(DisconnectReason::User) else {
			tracing::debug!(target = "ww.session", "already disconnected");
			return;
		};

		if let Some(ProviderHandle::Solana(provider)) = dropped.map(|binding| binding.provider.handle) {
			if let Err(err) = provider.disconnect().await {
				tracing::debug!(target = "ww.session", error = %err, "wallet disconnect failed; session cleared anyway");
			}
		}
		self.notifier.notify("Wallet disconnected", Severity::Info);
	}

	/// Aborts a pending deep-link wait, failing that connect as cancelled.
	pub fn cancel_pending(&self) -> bool {
		match self.pending.lock().take() {
			Some(handle) => {
				handle.cancel();
				true
			}
			None => false,
		}
	}

	fn end_session(&self, reason: DisconnectReason) -> bool {
		self.reset(reason).is_some()
	}

	/// Moves to Disconnected. Returns the dropped binding and prior status, or
	/// `None` when there was nothing to end.
	fn reset(&self, reason: DisconnectReason) -> Option<(Option<Binding>, SessionStatus)> {
		let (dropped, previous) = {
			let mut state = self.state.lock();
			let previous = state.session.status();
			if previous == SessionStatus::Disconnected {
				return None;
			}
			state.generation += 1;
			(state.session.reset(), previous)
		};

		if previous == SessionStatus::Connected {
			if let Err(err) = self.preferences.clear_marker() {
				tracing::warn!(target = "ww.session", error = %err, "failed to clear connection marker");
			}
		}
		tracing::info!(target = "ww.session", ?reason, ?previous, "disconnected");
		self.emit(SessionEvent::Disconnected { reason });
		Some((dropped, previous))
	}

	/// Applies an event reported by the connected wallet.
	pub fn handle_provider_event(&self, event: ProviderEvent) {
		let Some((family, account)) = self
			.state
			.lock()
			.session
			.binding()
			.map(|binding| (binding.family, binding.account.clone()))
		else {
			tracing::debug!(target = "ww.session", ?event, "provider event without a session; ignoring");
			return;
		};

		match event {
			ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
				None => {
					self.end_session(DisconnectReason::AccountsRemoved);
				}
				Some(next) if next != account => {
					if self.state.lock().session.set_account(next.clone()) {
						tracing::info!(target = "ww.session", account = %next, "account changed");
						self.emit(SessionEvent::AccountChanged { account: next });
					}
				}
				Some(_) => {}
			},
			ProviderEvent::ChainChanged(ref raw) => {
				if family != NetworkFamily::Evm {
					return;
				}
				let Some(chain) = event.chain_id() else {
					tracing::warn!(target = "ww.session", raw = %raw, "unparseable chainChanged payload");
					return;
				};
				let target = self.config.target_chain_id();
				if chain != target && self.config.chain_change_policy == ChainChangePolicy::Disconnect {
					tracing::info!(target = "ww.session", %chain, %target, "wallet left the target chain");
					self.end_session(DisconnectReason::ChainChanged);
					return;
				}
				if self.state.lock().session.set_chain(ChainRef::Evm(chain)) {
					self.emit(SessionEvent::ChainChanged {
						chain: ChainRef::Evm(chain),
					});
				}
			}
			ProviderEvent::Disconnect => {
				self.end_session(DisconnectReason::ProviderDisconnected);
			}
		}
	}

	/// Pumps the connected wallet's events into
	/// [`handle_provider_event`](Self::handle_provider_event) until that
	/// session ends. Returns at once if there is no session or the wallet
	/// does not emit events.
	pub async fn watch_provider_events(&self) {
		let (generation, subscription) = {
			let state = self.state.lock();
			let subscription = state.session.binding().and_then(|b| b.provider.handle.subscribe());
			(state.generation, subscription)
		};
		let Some(mut events) = subscription else {
			return;
		};

		while let Some(event) = events.recv().await {
			if self.state.lock().generation != generation {
				break;
			}
			self.handle_provider_event(event);
			if !self.is_connected() {
				break;
			}
		}
	}

	/// Clears remembered wallet choices for `family`, or all of them.
	pub fn clear_preferences(&self, family: Option<NetworkFamily>) -> ww_runtime::Result<()> {
		self.preferences.forget(family)
	}

	/// Wallets currently detectable for `family`.
	pub fn detect(&self, family: NetworkFamily) -> Vec<ProviderDescriptor> {
		self.registry.enumerate(family)
	}

	pub fn subscribe(&self) -> EventStream {
		EventStream::new(self.events.subscribe())
	}

	pub fn is_connected(&self) -> bool {
		self.state.lock().session.is_connected()
	}

	pub fn status(&self) -> SessionStatus {
		self.state.lock().session.status()
	}

	pub fn current_account(&self) -> Option<String> {
		self.state.lock().session.binding().map(|b| b.account.clone())
	}

	pub fn current_chain(&self) -> Option<ChainRef> {
		self.state.lock().session.binding().map(|b| b.chain)
	}

	pub fn snapshot(&self) -> SessionSnapshot {
		self.state.lock().session.snapshot()
	}

	/// Family of the last session, read from storage when the service was
	/// built. Only used to pre-select the family prompt; nothing connects
	/// on its own.
	pub fn remembered_family(&self) -> Option<NetworkFamily> {
		self.remembered_family
	}

	pub fn preferences(&self) -> &PreferenceStore {
		&self.preferences
	}

	pub fn config(&self) -> &WalletConfig {
		&self.config
	}

	fn suggested_family(&self) -> Option<NetworkFamily> {
		self.state
			.lock()
			.session
			.binding()
			.map(|b| b.family)
			.or(self.remembered_family)
	}

	/// Snapshot of the live session if it matches `family` (any family when `None`).
	fn live_snapshot(&self, family: Option<NetworkFamily>) -> Option<SessionSnapshot> {
		let state = self.state.lock();
		let binding = state.session.binding()?;
		if family.is_some_and(|f| f != binding.family) {
			return None;
		}
		Some(state.session.snapshot())
	}

	fn emit(&self, event: SessionEvent) {
		let _ = self.events.send(event);
	}
}
