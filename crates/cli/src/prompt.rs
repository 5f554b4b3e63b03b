//! Wallet and family pickers on the terminal.

use std::io::{IsTerminal, Write};
use std::rc::Rc;

use async_trait::async_trait;
use colored::Colorize;
use ww::{ProviderDescriptor, PromptChoice, ScriptedPrompt, SelectionPrompt};
use ww_protocol::NetworkFamily;

/// Asks on stderr, answers from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

/// One line from stdin, off the runtime thread. `None` on EOF or error.
async fn read_answer(question: &str) -> Option<String> {
	eprint!("{} ", question.bold());
	let _ = std::io::stderr().flush();

	let line = tokio::task::spawn_blocking(|| {
		let mut input = String::new();
		match std::io::stdin().read_line(&mut input) {
			Ok(0) | Err(_) => None,
			Ok(_) => Some(input.trim().to_string()),
		}
	})
	.await
	.ok()
	.flatten()?;

	(!line.is_empty()).then_some(line)
}

/// 1-based menu answer to a 0-based index.
fn parse_index(answer: &str, len: usize) -> Option<usize> {
	let n: usize = answer.parse().ok()?;
	(1..=len).contains(&n).then(|| n - 1)
}

fn parse_yes(answer: Option<&str>) -> bool {
	matches!(answer.map(str::to_ascii_lowercase).as_deref(), Some("y" | "yes"))
}

#[async_trait(?Send)]
impl SelectionPrompt for TerminalPrompt {
	async fn choose_wallet(&self, family: NetworkFamily, candidates: &[ProviderDescriptor]) -> Option<PromptChoice> {
		eprintln!("{}", format!("Select a {} wallet:", family.label()).green().bold());
		for (i, candidate) in candidates.iter().enumerate() {
			eprintln!("  {}) {} {}", i + 1, candidate.display_name, format!("({})", candidate.id).dimmed());
		}

		let answer = read_answer(&format!("Wallet [1-{}]:", candidates.len())).await?;
		let Some(index) = parse_index(&answer, candidates.len()) else {
			tracing::debug!(target = "ww.cli", answer, "wallet answer out of range");
			return None;
		};
		let remember = parse_yes(read_answer("Remember this choice? [y/N]").await.as_deref());

		Some(PromptChoice { index, remember })
	}

	async fn choose_family(&self, suggested: Option<NetworkFamily>) -> Option<NetworkFamily> {
		eprintln!("{}", "Connect to which network?".green().bold());
		for (i, family) in NetworkFamily::ALL.iter().enumerate() {
			let mark = if Some(*family) == suggested { " (last used)" } else { "" };
			eprintln!("  {}) {}{}", i + 1, family.label(), mark.dimmed());
		}

		match read_answer("Network [1-2]:").await {
			// enter keeps the suggestion
			None => suggested,
			Some(answer) => parse_index(&answer, NetworkFamily::ALL.len())
				.map(|i| NetworkFamily::ALL[i])
				.or_else(|| answer.parse().ok()),
		}
	}
}

/// Prompt for this invocation: scripted when `--pick` was given,
/// interactive on a terminal, otherwise one that dismisses every dialog.
pub fn for_invocation(pick: Option<&str>, remember: bool) -> Rc<dyn SelectionPrompt> {
	match pick {
		Some(id) => {
			let prompt = ScriptedPrompt::picking(id).accepting_suggestion();
			Rc::new(if remember { prompt.remembering() } else { prompt })
		}
		None if std::io::stdin().is_terminal() => Rc::new(TerminalPrompt),
		None => Rc::new(ScriptedPrompt::dismissing()),
	}
}
