//! teleport-text CLI
//!
//! Sends a message one character at a time through a simulated quantum
//! teleportation channel and prints what the receiver decoded.
//!
//! ## Environment Variables
//! - `TELEPORT_SHOTS`: Shots per backend call (default: 1024)
//! - `TELEPORT_TRIAL_BUDGET`: Backend calls allowed per batch (default: 100)
//! - `TELEPORT_BATCHES`: Batches accumulated per character (default: 100)
//! - `TELEPORT_SEED`: Base simulator seed (default: random)
//! - `RUST_LOG`: Log filter (default: teleport_text=warn)

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use teleport_text::core::{DEFAULT_BATCHES, DEFAULT_SHOTS, DEFAULT_TRIAL_BUDGET};
use teleport_text::protocol::{DEFAULT_PLACEHOLDER, encode, teleportation_circuit};
use teleport_text::{FailurePolicy, MessagePipeline, Simulator, TransmitConfig, transmit_parallel};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "teleport-text")]
#[command(version)]
#[command(about = "Teleport a text message through a simulated quantum channel", long_about = None)]
struct Args {
    /// Message to transmit
    message: String,

    /// Shots per backend call
    #[arg(long, default_value_t = DEFAULT_SHOTS, env = "TELEPORT_SHOTS")]
    shots: u32,

    /// Backend calls allowed per batch before giving up
    #[arg(long, default_value_t = DEFAULT_TRIAL_BUDGET, env = "TELEPORT_TRIAL_BUDGET")]
    trial_budget: u32,

    /// Batches accumulated per character before decoding
    #[arg(long, default_value_t = DEFAULT_BATCHES, env = "TELEPORT_BATCHES")]
    batches: u32,

    /// Base seed for reproducible runs
    #[arg(long, env = "TELEPORT_SEED")]
    seed: Option<u64>,

    /// Worker threads
    #[arg(short, long, default_value_t = 1)]
    workers: usize,

    /// Stop at the first character that cannot be transmitted
    #[arg(long, default_value_t = false, conflicts_with = "placeholder")]
    abort: bool,

    /// Character emitted in place of one that cannot be transmitted
    #[arg(long, default_value_t = DEFAULT_PLACEHOLDER)]
    placeholder: char,

    /// Print the teleportation circuit for the first character to stderr
    #[arg(long, default_value_t = false)]
    show_circuit: bool,

    /// Log progress at debug level
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> TransmitConfig {
        let failure_policy = if self.abort {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Placeholder(self.placeholder)
        };
        TransmitConfig {
            shots: self.shots,
            trial_budget: self.trial_budget,
            batches: self.batches,
            workers: self.workers,
            failure_policy,
            seed: self.seed,
        }
    }
}

fn simulator(seed: Option<u64>, offset: usize) -> Simulator {
    match seed {
        Some(seed) => Simulator::with_seed(seed.wrapping_add(offset as u64)),
        None => Simulator::new(),
    }
}

/// Runs the transmission described by `args` and returns the decoded message.
fn transmit(args: &Args) -> Result<String> {
    let config = args.config();
    config.validate().context("invalid transmission settings")?;

    if args.show_circuit {
        match args.message.chars().next().map(encode) {
            Some(Ok((state, _))) => eprintln!("{}", teleportation_circuit(&state)),
            Some(Err(err)) => warn!(error = %err, "no circuit to show"),
            None => warn!("empty message, no circuit to show"),
        }
    }

    info!(
        characters = args.message.chars().count(),
        shots = config.shots,
        batches = config.batches,
        workers = config.workers,
        "transmitting"
    );

    let received = if config.workers > 1 {
        transmit_parallel(&args.message, &config, |index| simulator(config.seed, index))
    } else {
        MessagePipeline::new(simulator(config.seed, 0), &config)?.transmit_message(&args.message)
    }
    .context("transmission aborted")?;
    Ok(received)
}

/// Writes the decoded stream followed by a single newline.
fn write_received(out: &mut impl Write, received: &str) -> io::Result<()> {
    writeln!(out, "{}", received)?;
    out.flush()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "teleport_text=debug" } else { "teleport_text=warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let received = transmit(&args)?;
    write_received(&mut io::stdout().lock(), &received).context("failed to write to stdout")?;
    Ok(())
}
