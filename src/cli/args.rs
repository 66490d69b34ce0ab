//! CLI argument definitions.
//!
//! All Clap derive structs for `sentra-sim` command-line parsing. Every
//! flag configures an observation surface; the simulation periods are
//! fixed constants and deliberately have no flags.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::observability::logging::LogFormat;

/// Simulation engine for the Sentra autonomous deception-defense agent.
#[derive(Parser, Debug)]
#[command(name = "sentra-sim", author, version, about)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", env = "SENTRA_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", env = "SENTRA_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Expose Prometheus metrics on 127.0.0.1:<port>.
    #[arg(long, env = "SENTRA_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Write the JSONL engine-event stream to this file ("-" for stderr).
    #[arg(long, env = "SENTRA_EVENTS")]
    pub events: Option<PathBuf>,

    /// Seed the simulation RNG for a deterministic replay.
    #[arg(long, env = "SENTRA_SEED")]
    pub seed: Option<u64>,

    /// Stop after this many seconds instead of waiting for a signal.
    #[arg(long)]
    pub duration: Option<u64>,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

// ============================================================================
// Tests
// ============================================================================
