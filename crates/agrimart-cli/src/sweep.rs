//! # Sweep Subcommand
//!
//! One pass of the recurring sweeps over a snapshot file. The snapshot is
//! loaded, swept at the wall clock (or at `--now`), and written back.
//! Reports are printed to stdout as JSON.
//!
//! Exit status is 0 when every candidate succeeded and 2 when at least one
//! candidate failed. Failed candidates are left untouched in the snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use agrimart_agentic::{SweepReport, TaskKind};
use agrimart_core::{Clock, ManualClock, SystemClock, Timestamp, UserId};
use agrimart_market::MarketSnapshot;

use crate::Market;

/// Arguments for the `agrimart sweep` subcommand.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Market snapshot to sweep. Rewritten in place unless `--dry-run`.
    #[arg(long)]
    pub state: PathBuf,

    /// Evaluate deadlines at this UTC instant instead of the wall clock.
    #[arg(long)]
    pub now: Option<Timestamp>,

    /// Which sweep to run.
    #[arg(long, value_enum, default_value_t = SweepTask::All)]
    pub task: SweepTask,

    /// Admin user notified of escalations. Repeat for several admins.
    #[arg(long = "admin")]
    pub admins: Vec<UserId>,

    /// Append the run's history entries to this file as JSON lines.
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Report what would change without writing the snapshot.
    #[arg(long)]
    pub dry_run: bool,
}

/// Sweep selection.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTask {
    /// Escalation first, then auto-confirmation.
    All,
    /// Escalate unanswered disputes.
    Escalation,
    /// Auto-confirm receipt of delivered orders.
    Confirmation,
}

impl SweepTask {
    fn kinds(self) -> Vec<TaskKind> {
        match self {
            Self::All => TaskKind::ALL.to_vec(),
            Self::Escalation => vec![TaskKind::DisputeEscalation],
            Self::Confirmation => vec![TaskKind::OrderAutoConfirmation],
        }
    }
}

/// Execute the sweep subcommand.
pub fn run_sweep(args: &SweepArgs, config_path: Option<&Path>) -> Result<u8> {
    let reports = sweep(args, config_path)?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(if reports.iter().any(SweepReport::has_failures) {
        2
    } else {
        0
    })
}

fn sweep(args: &SweepArgs, config_path: Option<&Path>) -> Result<Vec<SweepReport>> {
    let config = crate::load_config(config_path)?;
    let snapshot = MarketSnapshot::load(&args.state)?;
    let clock: Arc<dyn Clock> = match args.now {
        Some(at) => Arc::new(ManualClock::new(at)),
        None => Arc::new(SystemClock),
    };
    let market = Market::open(snapshot, config, clock, args.admins.clone());

    let reports: Vec<SweepReport> = args
        .task
        .kinds()
        .into_iter()
        .map(|kind| market.service.run_task(kind))
        .collect();

    if args.dry_run {
        tracing::info!("dry run; snapshot not written");
    } else {
        market
            .snapshot()
            .save(&args.state)
            .with_context(|| format!("failed to write snapshot {}", args.state.display()))?;
    }
    if let Some(path) = &args.history {
        let written = market.append_history(path)?;
        tracing::info!(entries = written, path = %path.display(), "history appended");
    }
    Ok(reports)
}
