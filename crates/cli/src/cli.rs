use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ww_protocol::NetworkFamily;

use crate::output::OutputFormat;
use crate::styles::cli_styles;

#[derive(Parser, Debug)]
#[command(name = "ww")]
#[command(about = "Wild West wallet connection flow from the command line")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Directory holding config.json and storage.json [default: $XDG_CONFIG_HOME/ww]
	#[arg(long, global = true, value_name = "DIR")]
	pub state_dir: Option<PathBuf>,

	/// Page fixture describing the injected wallets (JSON)
	#[arg(long = "env", global = true, value_name = "FILE")]
	pub env_file: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// List the wallets injected into the page
	Detect {
		/// Only this family (evm|solana); both when omitted
		#[arg(long, value_parser = parse_family)]
		family: Option<NetworkFamily>,
	},

	/// Run the connection flow and print the session
	Connect {
		/// Family to connect (evm|solana); asked interactively when omitted
		#[arg(long, value_parser = parse_family)]
		family: Option<NetworkFamily>,

		/// Answer the wallet picker with this provider id
		#[arg(long, value_name = "ID")]
		pick: Option<String>,

		/// Tick "remember my choice" in the wallet picker
		#[arg(long)]
		remember: bool,

		/// Skip revoking existing trust before a Solana connect
		#[arg(long)]
		no_fresh: bool,
	},

	/// Forget the last connected session
	Disconnect,

	/// Show the last connected family and remembered wallets
	Status,

	/// Inspect or clear remembered wallets
	Prefs {
		#[command(subcommand)]
		action: PrefsAction,
	},
}

#[derive(Subcommand, Debug)]
pub enum PrefsAction {
	/// Print remembered wallets
	Show,
	/// Forget remembered wallets
	Clear {
		/// Only this family; all when omitted
		#[arg(long, value_parser = parse_family)]
		family: Option<NetworkFamily>,
	},
}

impl Commands {
	pub fn name(&self) -> &'static str {
		match self {
			Commands::Detect { .. } => "detect",
			Commands::Connect { .. } => "connect",
			Commands::Disconnect => "disconnect",
			Commands::Status => "status",
			Commands::Prefs {
				action: PrefsAction::Show,
			} => "prefs.show",
			Commands::Prefs {
				action: PrefsAction::Clear { .. },
			} => "prefs.clear",
		}
	}
}

fn parse_family(value: &str) -> Result<NetworkFamily, String> {
	value.parse()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn connect_flags_parse() {
		let cli = Cli::try_parse_from([
			"ww", "-vv", "--env", "page.json", "connect", "--family", "base", "--pick", "metamask", "--remember",
		])
		.unwrap();

		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.env_file, Some(PathBuf::from("page.json")));
		match cli.command {
			Commands::Connect {
				family,
				pick,
				remember,
				no_fresh,
			} => {
				assert_eq!(family, Some(NetworkFamily::Evm));
				assert_eq!(pick.as_deref(), Some("metamask"));
				assert!(remember);
				assert!(!no_fresh);
			}
			other => panic!("unexpected command {other:?}"),
		}
	}

	#[test]
	fn global_flags_after_subcommand() {
		let cli = Cli::try_parse_from(["ww", "status", "-f", "text", "--state-dir", "/tmp/ww"]).unwrap();

		assert_eq!(cli.format, OutputFormat::Text);
		assert_eq!(cli.state_dir, Some(PathBuf::from("/tmp/ww")));
		assert_eq!(cli.command.name(), "status");
	}

	#[test]
	fn unknown_family_is_rejected() {
		assert!(Cli::try_parse_from(["ww", "detect", "--family", "bitcoin"]).is_err());
	}

	#[test]
	fn prefs_clear_names_itself() {
		let cli = Cli::try_parse_from(["ww", "prefs", "clear", "--family", "solana"]).unwrap();
		assert_eq!(cli.command.name(), "prefs.clear");
	}
}
