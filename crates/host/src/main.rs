//! Slugline host binary.
//!
//! `slugline serve` speaks JSON lines over stdio so an editor extension can
//! drive the sync pipeline. Logs go to stderr; stdout carries protocol
//! output only.

mod cli;
mod outbox;
mod prompt;
mod protocol;
mod session;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use protocol::{HostEvent, HostOutput};
use session::Session;
use slugline_document::{DocumentId, RenderMode};
use slugline_sync::{SluglineConfig, pdf_file_name};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	match cli.command {
		Command::Serve { config } => serve(load_config(config.as_deref())?).await,
		Command::Check { file, config } => check(&file, &load_config(config.as_deref())?),
		Command::ExportName { file, highlight } => {
			println!("{}", pdf_file_name(&file, &highlight).display());
			Ok(())
		}
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("SLUGLINE_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("slugline=debug")
			} else {
				EnvFilter::new("slugline=info")
			}
		});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(false)
		.init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SluglineConfig> {
	let path: Option<PathBuf> = path.map(Path::to_path_buf).or_else(SluglineConfig::default_path);
	match path {
		Some(path) => SluglineConfig::load(&path).with_context(|| format!("loading {}", path.display())),
		None => Ok(SluglineConfig::default()),
	}
}

async fn serve(config: SluglineConfig) -> anyhow::Result<()> {
	info!("serving on stdio");
	let mut session = Session::new(config);
	let outbox = session.outbox();
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	let mut stdout = tokio::io::stdout();

	loop {
		let outputs = tokio::select! {
			line = lines.next_line() => {
				let Some(line) = line.context("reading stdin")? else {
					break;
				};
				if line.trim().is_empty() {
					continue;
				}
				match serde_json::from_str::<HostEvent>(&line) {
					Ok(event) => session.handle(event).await,
					Err(err) => {
						warn!(error = %err, "malformed event");
						vec![HostOutput::Error {
							message: format!("malformed event: {err}"),
						}]
					}
				}
			}
			() = outbox.ready() => session.flush(),
		};
		if outputs.is_empty() {
			continue;
		}
		for output in outputs {
			let mut json = serde_json::to_string(&output)?;
			json.push('\n');
			stdout.write_all(json.as_bytes()).await?;
		}
		stdout.flush().await?;
	}

	info!("stdin closed, exiting");
	Ok(())
}

fn check(file: &Path, config: &SluglineConfig) -> anyhow::Result<()> {
	let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
	let absolute = std::path::absolute(file)?;
	let document = DocumentId::from_path(&absolute)?;

	let parsed = slugline_parser::parse_text(&text, &config.parser, RenderMode::SummaryOnly)
		.with_context(|| format!("parsing {}", file.display()))?;
	println!("{}", serde_json::to_string_pretty(&parsed.summary(&document))?);
	Ok(())
}
