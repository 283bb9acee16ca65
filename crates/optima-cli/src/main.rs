//! `optima`: replay recorded artifact delta streams and plan script-to-video scenes.

mod commands;
mod config;
mod observability;

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::commands::{RevealMode, StreamFormat};

#[derive(Debug, Parser)]
#[command(name = "optima", version, about = "Artifact stream replay and video scene planning")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fold a recorded delta stream into its final artifact.
    Replay(ReplayArgs),
    /// Split a narration script into timed scenes.
    Plan(PlanArgs),
}

#[derive(Debug, clap::Args)]
struct ReplayArgs {
    /// Recorded stream, or `-` for stdin.
    file: PathBuf,
    /// Input format. Guessed from the extension when omitted.
    #[arg(long, value_enum)]
    format: Option<StreamFormat>,
    /// Events added per re-delivered snapshot.
    #[arg(long, default_value_t = 1)]
    batch: usize,
}

#[derive(Debug, clap::Args)]
struct PlanArgs {
    /// Script text file, or `-` for stdin.
    file: PathBuf,
    /// Target video length in seconds.
    #[arg(long)]
    duration: f64,
    /// Also time on-screen text for every scene.
    #[arg(long, value_enum)]
    reveals: Option<RevealMode>,
    /// JSON file overriding the timing constants.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    config::init();
    observability::init_observability();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => {
            let raw = read_input(&args.file)?;
            let format = args
                .format
                .unwrap_or_else(|| StreamFormat::from_extension(&args.file));
            let events = commands::decode_events(&raw, format)
                .with_context(|| format!("decoding {}", args.file.display()))?;
            let report = commands::replay(events, args.batch).await;
            print_json(&report)
        }
        Command::Plan(args) => {
            let timing = config::load_timing_config(args.config.as_deref())?;
            let raw = read_input(&args.file)?;
            let script = String::from_utf8(raw).context("script is not UTF-8")?;
            let report = commands::plan(&script, args.duration, args.reveals, &timing);
            print_json(&report)
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
