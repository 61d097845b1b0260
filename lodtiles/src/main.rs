mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[command(flatten)]
	verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	#[clap(alias = "server")]
	/// Serve dynamic vector tiles and tile archives via http
	Serve(tools::serve::Subcommand),

	/// Show which dataset and SQL a tile request would use
	Explain(tools::explain::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Serve(arguments) => tools::serve::run(arguments),
		Commands::Explain(arguments) => tools::explain::run(arguments),
	}
}

#[cfg(test)]
mod tests {
	use crate::{Cli, run};
	use anyhow::Result;
	use clap::Parser;

	pub fn run_command(arg_vec: Vec<&str>) -> Result<String> {
		let cli = Cli::try_parse_from(arg_vec)?;
		let msg = format!("{cli:?}");
		run(cli)?;
		Ok(msg)
	}

	#[test]
	fn help() {
		let err = run_command(vec!["lodtiles"]).unwrap_err().to_string();
		assert!(err.contains("Usage: lodtiles [OPTIONS] <COMMAND>"), "{err}");
		assert!(err.contains("serve"));
		assert!(err.contains("explain"));
	}

	#[test]
	fn version() {
		let err = run_command(vec!["lodtiles", "-V"]).unwrap_err().to_string();
		assert!(err.starts_with("lodtiles "));
	}

	#[test]
	fn explain_requires_arguments() {
		let err = run_command(vec!["lodtiles", "explain"]).unwrap_err().to_string();
		assert!(err.starts_with("Show which dataset and SQL a tile request would use"), "{err}");
	}
}
