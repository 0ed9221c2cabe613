//! # Sweep Worker
//!
//! Background task that drives the recurring sweeps with real time.
//!
//! The worker polls the [`TaskScheduler`] once per second and runs every
//! task that is due. The cadence comes from `SWEEP_INTERVAL_SECONDS` and is
//! re-read on each poll, so a runtime config change takes effect without a
//! restart. A failing candidate is counted in its sweep's report; a failing
//! run is recorded on its task and the next run still happens on schedule.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use agrimart_agentic::{SweepReport, TaskScheduler};

use crate::service::MarketService;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Runs the escalation and auto-confirmation sweeps on their cadence.
#[derive(Debug)]
pub struct SweepWorker {
    service: MarketService,
    scheduler: TaskScheduler,
}

impl SweepWorker {
    pub fn new(service: MarketService) -> Self {
        let every = service.config().sweep_interval_seconds;
        Self {
            service,
            scheduler: TaskScheduler::with_sweeps(every),
        }
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// Run every task due at the service clock's current reading.
    pub fn tick(&mut self) -> Vec<SweepReport> {
        let now = self.service.now();
        self.scheduler.set_interval(self.service.config().sweep_interval_seconds);

        let mut reports = Vec::new();
        for kind in self.scheduler.take_due(now) {
            let report = self.service.run_task(kind);
            let error = report
                .has_failures()
                .then(|| format!("{} of {} candidates failed", report.failed, report.examined));
            self.scheduler.record_result(kind, error);
            reports.push(report);
        }
        reports
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            every_seconds = self.service.config().sweep_interval_seconds,
            "sweep worker started"
        );
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("sweep worker stopped");
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
