//! Picking one wallet out of several.

use std::rc::Rc;

use serde::Serialize;
use ww_protocol::NetworkFamily;

use crate::device::DeviceProfile;
use crate::error::{ConnectError, Result};
use crate::preferences::PreferenceStore;
use crate::prompt::SelectionPrompt;
use crate::registry::ProviderDescriptor;

/// How the selected wallet was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
	OnlyCandidate,
	Remembered,
	/// The page is open inside this wallet's own browser.
	WalletBrowser,
	Prompted,
}

#[derive(Debug, Clone)]
pub enum Selection {
	Selected {
		descriptor: ProviderDescriptor,
		reason: SelectionReason,
	},
	/// The user dismissed the picker. Not an error.
	Cancelled,
}

pub struct WalletSelector {
	prompt: Rc<dyn SelectionPrompt>,
	preferences: PreferenceStore,
}

impl WalletSelector {
	pub fn new(prompt: Rc<dyn SelectionPrompt>, preferences: PreferenceStore) -> Self {
		Self { prompt, preferences }
	}

	/// Chooses among `candidates`, in order of precedence:
	///
	/// 1. none: [`ConnectError::NoProviderFound`]
	/// 2. exactly one: that one, no prompt
	/// 3. `remembered` matches a candidate id: that one, no prompt
	/// 4. on mobile inside a wallet's browser: that wallet, no prompt
	/// 5. otherwise prompt; a ticked "remember" persists the choice
	pub async fn select(
		&self,
		family: NetworkFamily,
		mut candidates: Vec<ProviderDescriptor>,
		remembered: Option<&str>,
		device: &DeviceProfile,
	) -> Result<Selection> {
		if candidates.is_empty() {
			return Err(ConnectError::NoProviderFound { family });
		}

		if candidates.len() == 1 {
			return Ok(selected(candidates.swap_remove(0), SelectionReason::OnlyCandidate));
		}

		if let Some(id) = remembered {
			if let Some(pos) = candidates.iter().position(|c| c.id == id) {
				return Ok(selected(candidates.swap_remove(pos), SelectionReason::Remembered));
			}
			tracing::debug!(target = "ww.selector", %family, id, "remembered wallet not present");
		}

		if device.mobile {
			if let Some(kind) = device.wallet_browser {
				if let Some(pos) = candidates.iter().position(|c| c.kind == kind) {
					return Ok(selected(candidates.swap_remove(pos), SelectionReason::WalletBrowser));
				}
			}
		}

		tracing::debug!(target = "ww.selector", %family, count = candidates.len(), "prompting for wallet");
		let Some(choice) = self.prompt.choose_wallet(family, &candidates).await else {
			tracing::info!(target = "ww.selector", %family, "wallet selection dismissed");
			return Ok(Selection::Cancelled);
		};

		if choice.index >= candidates.len() {
			tracing::warn!(
				target = "ww.selector",
				index = choice.index,
				count = candidates.len(),
				"prompt returned an out-of-range choice; treating as dismissed"
			);
			return Ok(Selection::Cancelled);
		}

		let descriptor = candidates.swap_remove(choice.index);
		if choice.remember {
			if let Err(err) = self.preferences.remember(family, &descriptor.id) {
				tracing::warn!(target = "ww.selector", error = %err, "failed to persist wallet preference");
			}
		}
		Ok(selected(descriptor, SelectionReason::Prompted))
	}
}

fn selected(descriptor: ProviderDescriptor, reason: SelectionReason) -> Selection {
	tracing::debug!(target = "ww.selector", id = %descriptor.id, ?reason, "wallet selected");
	Selection::Selected { descriptor, reason }
}
