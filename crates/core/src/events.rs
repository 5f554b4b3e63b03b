//! Notifications broadcast by [`WalletService`](crate::WalletService).

use serde::Serialize;
use tokio::sync::broadcast;
use ww_protocol::{ChainRef, NetworkFamily};

use crate::deeplink::WalletLinks;
use crate::session::SessionSnapshot;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
	/// `disconnect()` was called.
	User,
	/// A connect for a different family took the session over.
	Replaced,
	/// The wallet reported an empty account list.
	AccountsRemoved,
	/// The wallet moved off the target chain.
	ChainChanged,
	/// The wallet emitted `disconnect`.
	ProviderDisconnected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
	Connecting { family: NetworkFamily },
	Connected { session: SessionSnapshot },
	Disconnected { reason: DisconnectReason },
	/// A failed or cancelled attempt returned the session to disconnected.
	ConnectFailed { code: &'static str, message: String },
	AccountChanged { account: String },
	ChainChanged { chain: ChainRef },
	/// A connect arrived while another was in flight; it runs next.
	Queued { waiting: usize },
	/// No wallet was injected on a phone; links to get one.
	InstallGuidance { family: NetworkFamily, wallets: Vec<WalletLinks> },
}

/// Receiver for [`SessionEvent`]s that skips over lag instead of failing.
pub struct EventStream {
	rx: broadcast::Receiver<SessionEvent>,
}

impl EventStream {
	pub(crate) fn new(rx: broadcast::Receiver<SessionEvent>) -> Self {
		Self { rx }
	}

	/// Next event, or `None` once the service is dropped.
	pub async fn recv(&mut self) -> Option<SessionEvent> {
		loop {
			match self.rx.recv().await {
				Ok(event) => return Some(event),
				Err(broadcast::error::RecvError::Lagged(n)) => {
					tracing::warn!(target = "ww.session", dropped = n, "event stream lagged, dropped events");
				}
				Err(broadcast::error::RecvError::Closed) => return None,
			}
		}
	}

	/// Next event if one is already queued.
	pub fn try_recv(&mut self) -> Option<SessionEvent> {
		loop {
			match self.rx.try_recv() {
				Ok(event) => return Some(event),
				Err(broadcast::error::TryRecvError::Lagged(n)) => {
					tracing::warn!(target = "ww.session", dropped = n, "event stream lagged, dropped events");
				}
				Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => return None,
			}
		}
	}

	/// Everything queued right now.
	pub fn drain(&mut self) -> Vec<SessionEvent> {
		std::iter::from_fn(|| self.try_recv()).collect()
	}
}
