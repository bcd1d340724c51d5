use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lingua")]
#[command(about = "Inspect translated-message bundles and locale fallback")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Look up message keys in a content fixture
	Lookup {
		/// Provider configuration (TOML)
		#[arg(long, value_name = "PATH")]
		config: Option<PathBuf>,

		/// Content fixture (JSON map of path to node properties)
		#[arg(long, value_name = "PATH")]
		content: PathBuf,

		/// Locale to look up, e.g. `de-CH` (defaults to the configured default)
		#[arg(long, short)]
		locale: Option<String>,

		/// Catalog name (the default catalog when omitted)
		#[arg(long, short)]
		name: Option<String>,

		/// Keys to translate; every key of the bundle chain when omitted
		keys: Vec<String>,
	},
	/// Print the fallback chain of a locale
	Chain {
		/// Default locale ending the chain
		#[arg(long = "default", value_name = "TAG", default_value = lingua_config::DEFAULT_LOCALE)]
		default_locale: String,

		/// Locale to start from
		locale: String,
	},
	/// Show how a locale string is parsed
	Parse {
		/// Locale string, e.g. `zh-hans-cn`
		input: String,
	},
}
