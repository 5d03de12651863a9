//! basic-synth - Terminal front-end for the synth engine
//!
//! Run with: cargo run -- --state my-patch.json

mod app;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::BasicSynth;

#[derive(Debug, Parser)]
#[command(name = "basic-synth", about = "Polyphonic sine synth with ladder filter and reverb")]
struct Args {
    /// Parameter state file, loaded at start and written back on exit
    #[arg(long)]
    state: Option<PathBuf>,

    /// Log file (the terminal is taken by the UI)
    #[arg(long, default_value = "basic-synth.log")]
    log: PathBuf,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let log_file = File::create(&args.log)
        .wrap_err_with(|| format!("failed to create log file {}", args.log.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    BasicSynth::new(args.state).run()
}
