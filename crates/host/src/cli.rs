use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "slugline")]
#[command(about = "Screenplay preview and outline sync host")]
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
	/// Serve JSON-lines events on stdin, writing updates to stdout
	Serve {
		/// Config file (defaults to the per-user config)
		#[arg(long, value_name = "PATH")]
		config: Option<PathBuf>,
	},
	/// Parse a file once and print its summary as JSON
	Check {
		file: PathBuf,

		#[arg(long, value_name = "PATH")]
		config: Option<PathBuf>,
	},
	/// Print the default PDF file name for a screenplay
	ExportName {
		file: PathBuf,

		/// Highlighted character (repeatable)
		#[arg(long = "highlight", value_name = "NAME")]
		highlight: Vec<String>,
	},
}
