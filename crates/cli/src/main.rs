//! Quill assist host.
//!
//! Reads one JSON [`HostInput`] per stdin line and writes one JSON
//! [`AssistEvent`] per stdout line. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use quill_assist::{AssistConfig, AssistEvent, Assistant, HostInput, run};
use quill_service::HttpAssistService;
use quill_worker::{TaskClass, spawn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Ghost-text and terminology assist for structured record fields")]
struct Args {
	/// TOML config file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let default_level = if args.verbose { "debug" } else { "info" };
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
		.with_writer(std::io::stderr)
		.init();

	let config = match &args.config {
		Some(path) => AssistConfig::load(path).with_context(|| format!("loading config from {}", path.display()))?,
		None => AssistConfig::default(),
	};
	info!(
		fields = config.fields.len(),
		agent = %config.services.agent_url,
		api = %config.services.api_url,
		"Starting quill"
	);

	let service = HttpAssistService::new(config.services.clone()).context("building HTTP client")?;
	let (event_tx, event_rx) = mpsc::unbounded_channel();
	let assistant = Assistant::new(config, Arc::new(service), event_tx)?;

	let (input_tx, input_rx) = mpsc::channel(64);
	let reader = spawn(TaskClass::Interactive, read_inputs(input_tx));
	let writer = spawn(TaskClass::Interactive, write_events(event_rx));

	// Dropping the assistant closes the event stream so the writer can finish.
	drop(run(assistant, input_rx).await);
	reader.await??;
	writer.await??;
	info!("stdin closed; exiting");
	Ok(())
}

async fn read_inputs(tx: mpsc::Sender<HostInput>) -> anyhow::Result<()> {
	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await? {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		match serde_json::from_str::<HostInput>(line) {
			Ok(input) => {
				if tx.send(input).await.is_err() {
					break;
				}
			}
			Err(error) => warn!(error = %error, "Ignoring malformed input line"),
		}
	}
	Ok(())
}

async fn write_events(mut rx: mpsc::UnboundedReceiver<AssistEvent>) -> anyhow::Result<()> {
	let mut stdout = tokio::io::stdout();
	while let Some(event) = rx.recv().await {
		let mut line = serde_json::to_vec(&event)?;
		line.push(b'\n');
		stdout.write_all(&line).await?;
		stdout.flush().await?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_config_and_verbosity() {
		let args = Args::try_parse_from(["quill", "--config", "quill.toml", "-v"]).unwrap();
		assert_eq!(args.config, Some(PathBuf::from("quill.toml")));
		assert!(args.verbose);

		let args = Args::try_parse_from(["quill"]).unwrap();
		assert_eq!(args.config, None);
		assert!(!args.verbose);
	}
}
