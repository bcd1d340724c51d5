//! `lingua` command line tool.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	match cli.command {
		Command::Lookup {
			config,
			content,
			locale,
			name,
			keys,
		} => commands::lookup(&mut out, config.as_deref(), &content, locale.as_deref(), name.as_deref(), &keys),
		Command::Chain { default_locale, locale } => commands::chain(&mut out, &default_locale, &locale),
		Command::Parse { input } => commands::parse(&mut out, &input),
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("lingua=debug,lingua_bundles=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(true).init();
}
