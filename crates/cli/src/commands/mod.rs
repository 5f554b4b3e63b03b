mod connect;
mod detect;
mod prefs;
mod session;

use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use serde::Serialize;
use ww::{SelectionPrompt, WalletConfig, WalletService};
use ww_runtime::scripted::{EnvironmentFixture, ScriptedEnvironment};
use ww_runtime::TokioTimer;

use crate::cli::{Cli, Commands, PrefsAction};
use crate::context_store::ContextState;
use crate::error::{CliError, Result};
use crate::notify::ConsoleNotifier;
use crate::output::{self, OutputFormat, ResultBuilder};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let started = Instant::now();
	let format = cli.format;
	let name = cli.command.name();
	let state = ContextState::load(cli.state_dir.as_deref())?;

	match cli.command {
		Commands::Detect { family } => {
			let env = load_environment(cli.env_file.as_deref())?;
			emit(name, detect::execute(&env, &state, family), format, started);
		}
		Commands::Connect {
			family,
			pick,
			remember,
			no_fresh,
		} => {
			let env = load_environment(cli.env_file.as_deref())?;
			let prompt = crate::prompt::for_invocation(pick.as_deref(), remember);
			let config = state.effective_config(no_fresh.then_some(false));
			let service = build_service(env, &state, prompt, config);
			emit(name, connect::execute(&service, family).await?, format, started);
		}
		Commands::Disconnect => emit(name, session::disconnect(&state)?, format, started),
		Commands::Status => emit(name, session::status(&state), format, started),
		Commands::Prefs { action } => {
			let data = match action {
				PrefsAction::Show => prefs::show(&state),
				PrefsAction::Clear { family } => prefs::clear(&state, family)?,
			};
			emit(name, data, format, started);
		}
	}
	Ok(())
}

fn emit<T: Serialize>(command: &str, data: T, format: OutputFormat, started: Instant) {
	let result = ResultBuilder::new(command).started_at(started).data(data).build();
	output::print_result(&result, format);
}

/// The page fixture from `--env`, or an empty desktop page.
fn load_environment(path: Option<&Path>) -> Result<Rc<ScriptedEnvironment>> {
	let Some(path) = path else {
		tracing::debug!(target = "ww.cli", "no --env given, using an empty page");
		return Ok(Rc::new(ScriptedEnvironment::new(EnvironmentFixture::default())));
	};

	let json = std::fs::read_to_string(path)?;
	let env = ScriptedEnvironment::from_json(&json).map_err(|source| CliError::Environment {
		path: path.to_path_buf(),
		source,
	})?;
	tracing::debug!(target = "ww.cli", path = %path.display(), "environment loaded");
	Ok(Rc::new(env))
}

fn build_service(
	env: Rc<ScriptedEnvironment>,
	state: &ContextState,
	prompt: Rc<dyn SelectionPrompt>,
	config: WalletConfig,
) -> WalletService {
	WalletService::builder(env, Rc::new(TokioTimer))
		.store(state.store())
		.prompt(prompt)
		.notifier(Rc::new(ConsoleNotifier))
		.config(config)
		.build()
}
