//! # Service Metrics
//!
//! In-process atomic counters, readable without an exporter, mirrored to
//! the `metrics` facade so an installed recorder sees the same values.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use agrimart_agentic::{SweepReport, TaskKind};

/// Shared counters.
#[derive(Debug, Clone, Default)]
pub struct ServiceMetrics {
    committed: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    escalated: Arc<AtomicU64>,
    auto_confirmed: Arc<AtomicU64>,
    sweep_failures: Arc<AtomicU64>,
    side_effect_failures: Arc<AtomicU64>,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// An operation committed.
    pub fn record_commit(&self, operation: &'static str) {
        self.committed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("agrimart_operations_total", "operation" => operation, "outcome" => "committed").increment(1);
    }

    /// An operation was refused; `code` is the error code.
    pub fn record_rejection(&self, operation: &'static str, code: &'static str) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("agrimart_operations_total", "operation" => operation, "outcome" => code).increment(1);
    }

    /// A history or notification sink, or a catalog release, failed.
    pub fn record_side_effect_failures(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.side_effect_failures.fetch_add(count, Ordering::Relaxed);
        metrics::counter!("agrimart_side_effect_failures_total").increment(count);
    }

    /// Fold one sweep run into the counters.
    pub fn record_sweep(&self, report: &SweepReport) {
        let applied = report.applied as u64;
        let failed = report.failed as u64;
        match report.task {
            TaskKind::DisputeEscalation => {
                self.escalated.fetch_add(applied, Ordering::Relaxed);
            }
            TaskKind::OrderAutoConfirmation => {
                self.auto_confirmed.fetch_add(applied, Ordering::Relaxed);
            }
        }
        self.sweep_failures.fetch_add(failed, Ordering::Relaxed);
        metrics::counter!("agrimart_sweep_runs_total", "task" => report.task.as_str()).increment(1);
        metrics::counter!("agrimart_sweep_applied_total", "task" => report.task.as_str()).increment(applied);
        metrics::counter!("agrimart_sweep_failed_total", "task" => report.task.as_str()).increment(failed);
    }

    pub fn committed(&self) -> u64 {
        self.committed.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn escalated(&self) -> u64 {
        self.escalated.load(Ordering::Relaxed)
    }

    pub fn auto_confirmed(&self) -> u64 {
        self.auto_confirmed.load(Ordering::Relaxed)
    }

    pub fn sweep_failures(&self) -> u64 {
        self.sweep_failures.load(Ordering::Relaxed)
    }

    pub fn side_effect_failures(&self) -> u64 {
        self.side_effect_failures.load(Ordering::Relaxed)
    }
}
