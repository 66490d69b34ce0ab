//! `sentra-sim` — simulation engine for the Sentra deception-defense agent.

use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;

use sentra_sim::cli::Cli;
use sentra_sim::engine::SimulationEngine;
use sentra_sim::error::{ExitCode, Result};
use sentra_sim::observability::{EventEmitter, init_logging, metrics};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    match run(cli).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    metrics::init_metrics(cli.metrics_port)?;

    let emitter = match cli.events.as_deref() {
        None => EventEmitter::noop(),
        Some(path) if path.as_os_str() == "-" => EventEmitter::stderr(),
        Some(path) => EventEmitter::from_file(path)?,
    };
    let emitter = Arc::new(emitter);

    let engine = Arc::new(cli.seed.map_or_else(
        || SimulationEngine::new(Arc::clone(&emitter)),
        |seed| SimulationEngine::with_seed(seed, Arc::clone(&emitter)),
    ));

    let started = Instant::now();
    let handles = engine.start()?;

    let reason = wait_for_stop(cli.duration).await?;
    engine.shutdown(reason);
    handles.join().await;
    metrics::set_uptime(started.elapsed());

    let snapshot = engine.snapshot();
    info!(
        total_threats = snapshot.metrics.total_threats,
        blocked = snapshot.metrics.blocked,
        anomalies = snapshot.metrics.anomalies,
        retained_logs = snapshot.logs.len(),
        "simulation finished"
    );

    Ok(())
}

/// Waits until the run should end: the optional `--duration` elapses,
/// or SIGINT/SIGTERM arrives. Returns the stop reason.
async fn wait_for_stop(duration: Option<u64>) -> Result<&'static str> {
    let mut sigterm =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    let reason = match duration {
        Some(secs) => {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(secs)) => "duration elapsed",
                _ = tokio::signal::ctrl_c() => "interrupted",
                _ = sigterm.recv() => "terminated",
            }
        }
        None => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => "interrupted",
                _ = sigterm.recv() => "terminated",
            }
        }
    };

    Ok(reason)
}
