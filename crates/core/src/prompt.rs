//! The two questions the flow may ask the user.

use async_trait::async_trait;
use parking_lot::Mutex;
use ww_protocol::NetworkFamily;

use crate::registry::ProviderDescriptor;

/// Answer to the wallet picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptChoice {
	/// Index into the candidate list that was shown.
	pub index: usize,
	/// "Remember my choice" was ticked.
	pub remember: bool,
}

/// UI the selector and state machine call out to. `None` means the user
/// dismissed the dialog.
#[async_trait(?Send)]
pub trait SelectionPrompt {
	async fn choose_wallet(&self, family: NetworkFamily, candidates: &[ProviderDescriptor]) -> Option<PromptChoice>;

	/// Asked when `connect` is called without a family. `suggested` is the
	/// family of the last connection, for pre-selection.
	async fn choose_family(&self, suggested: Option<NetworkFamily>) -> Option<NetworkFamily>;
}

/// Prompt with canned answers, for non-interactive hosts and tests.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
	wallet_id: Option<String>,
	remember: bool,
	family: Option<NetworkFamily>,
	accept_suggested: bool,
	wallet_prompts: Mutex<Vec<Vec<String>>>,
	family_prompts: Mutex<Vec<Option<NetworkFamily>>>,
}

impl ScriptedPrompt {
	/// Dismisses every dialog.
	pub fn dismissing() -> Self {
		Self::default()
	}

	/// Picks the candidate with this id.
	pub fn picking(id: impl Into<String>) -> Self {
		Self {
			wallet_id: Some(id.into()),
			..Self::default()
		}
	}

	pub fn remembering(mut self) -> Self {
		self.remember = true;
		self
	}

	pub fn choosing_family(mut self, family: NetworkFamily) -> Self {
		self.family = Some(family);
		self
	}

	/// Answers the family question with whatever was suggested.
	pub fn accepting_suggestion(mut self) -> Self {
		self.accept_suggested = true;
		self
	}

	/// Candidate ids shown on each wallet prompt so far.
	pub fn wallet_prompts(&self) -> Vec<Vec<String>> {
		self.wallet_prompts.lock().clone()
	}

	/// Suggestions passed to each family prompt so far.
	pub fn family_prompts(&self) -> Vec<Option<NetworkFamily>> {
		self.family_prompts.lock().clone()
	}
}

#[async_trait(?Send)]
impl SelectionPrompt for ScriptedPrompt {
	async fn choose_wallet(&self, _family: NetworkFamily, candidates: &[ProviderDescriptor]) -> Option<PromptChoice> {
		self.wallet_prompts
			.lock()
			.push(candidates.iter().map(|c| c.id.clone()).collect());
		let wanted = self.wallet_id.as_deref()?;
		let index = candidates.iter().position(|c| c.id == wanted)?;
		Some(PromptChoice {
			index,
			remember: self.remember,
		})
	}

	async fn choose_family(&self, suggested: Option<NetworkFamily>) -> Option<NetworkFamily> {
		self.family_prompts.lock().push(suggested);
		if self.accept_suggested && suggested.is_some() {
			return suggested;
		}
		self.family
	}
}
