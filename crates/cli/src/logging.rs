//! `tracing` setup for the `ww` binary. Logs go to stderr so stdout stays a
//! clean result envelope.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Default directives per `-v` count. `RUST_LOG` wins when set.
fn default_directives(verbosity: u8) -> &'static str {
	match verbosity {
		// the notifier already prints the outcome
		0 => "error,ww=off,ww_runtime=off",
		1 => "info,ww_runtime=warn",
		_ => "debug",
	}
}

pub fn init_logging(verbosity: u8) {
	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

	let stderr = std::io::stderr.with_max_level(tracing::Level::TRACE);

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(stderr)
		.with_ansi(std::io::stderr().is_terminal())
		.with_target(verbosity > 1)
		.with_level(true)
		.compact()
		.init();
}
