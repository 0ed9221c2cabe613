//! # Serve Subcommand
//!
//! Loads a snapshot, runs the [`SweepWorker`] on the wall clock until
//! ctrl-c, then stops the worker and writes the snapshot back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::sync::watch;

use agrimart_core::{SystemClock, UserId};
use agrimart_market::{MarketSnapshot, SweepWorker};

use crate::Market;

/// Arguments for the `agrimart serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Market snapshot to load and write back on shutdown.
    #[arg(long)]
    pub state: PathBuf,

    /// Admin user notified of escalations. Repeat for several admins.
    #[arg(long = "admin")]
    pub admins: Vec<UserId>,

    /// Append the session's history entries to this file on shutdown.
    #[arg(long)]
    pub history: Option<PathBuf>,
}

/// Execute the serve subcommand.
pub fn run_serve(args: &ServeArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = crate::load_config(config_path)?;
    let snapshot = MarketSnapshot::load(&args.state)?;
    let market = Market::open(snapshot, config, Arc::new(SystemClock), args.admins.clone());

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = SweepWorker::new(market.service.clone()).spawn(shutdown_rx);

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;
        tracing::info!("shutdown requested");
        // The worker also stops if the receiver sees the sender dropped.
        let _ = shutdown_tx.send(true);
        worker.await.context("sweep worker panicked")?;
        Ok::<_, anyhow::Error>(())
    })?;

    market
        .snapshot()
        .save(&args.state)
        .with_context(|| format!("failed to write snapshot {}", args.state.display()))?;
    if let Some(path) = &args.history {
        market.append_history(path)?;
    }

    let metrics = market.service.metrics();
    println!(
        "OK: saved {} ({} auto-confirmed, {} escalated, {} sweep failures)",
        args.state.display(),
        metrics.auto_confirmed(),
        metrics.escalated(),
        metrics.sweep_failures()
    );
    Ok(0)
}
