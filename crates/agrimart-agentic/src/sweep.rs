//! # Sweep Selection
//!
//! Pure candidate selection for the two time-based sweeps. Given a snapshot
//! of records, `now` and the config, these functions name what should be
//! acted on. They read nothing else and write nothing.
//!
//! Selection is only a first pass: the caller re-validates each candidate
//! under the record lock before applying it (the record may have changed
//! since the snapshot), then tallies the result in a [`SweepReport`].

use serde::{Deserialize, Serialize};

use agrimart_arbitration::Dispute;
use agrimart_core::{DisputeId, MarketConfig, OrderId, Timestamp};
use agrimart_state::Order;

use crate::scheduler::TaskKind;

/// Disputes that are open, unanswered, and past their response deadline.
pub fn select_overdue_disputes<'a, I>(disputes: I, now: Timestamp, config: &MarketConfig) -> Vec<(OrderId, DisputeId)>
where
    I: IntoIterator<Item = &'a Dispute>,
{
    disputes
        .into_iter()
        .filter(|d| d.is_overdue(now, config))
        .map(|d| (d.order_id, d.id))
        .collect()
}

/// Delivered orders whose receipt window has elapsed with no active dispute.
pub fn select_due_confirmations<'a, I>(orders: I, now: Timestamp, config: &MarketConfig) -> Vec<OrderId>
where
    I: IntoIterator<Item = &'a Order>,
{
    orders
        .into_iter()
        .filter(|o| o.is_due_for_auto_confirm(now, config))
        .map(|o| o.id)
        .collect()
}

/// What happened to one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOutcome {
    /// The transition was applied.
    Applied,
    /// The record no longer qualified when re-checked under the lock.
    Skipped,
    /// The transition failed; the record was left untouched.
    Failed,
}

/// Tally of one sweep run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub task: TaskKind,
    pub ran_at: Timestamp,
    pub examined: usize,
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SweepReport {
    /// An empty report for a run starting at `ran_at`.
    pub fn new(task: TaskKind, ran_at: Timestamp) -> Self {
        Self {
            task,
            ran_at,
            examined: 0,
            applied: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Count one candidate.
    pub fn record(&mut self, outcome: SweepOutcome) {
        self.examined += 1;
        match outcome {
            SweepOutcome::Applied => self.applied += 1,
            SweepOutcome::Skipped => self.skipped += 1,
            SweepOutcome::Failed => self.failed += 1,
        }
    }

    /// Whether any candidate failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
