//! # Recurring Task Scheduler
//!
//! Fixed-cadence recurring tasks for the marketplace sweeps. The scheduler
//! is pure bookkeeping: it answers "which tasks are due at `now`" and
//! records runs. Driving it with real time is the worker's job, so every
//! decision here is testable with a hand-set timestamp.
//!
//! ## Cadence
//!
//! A task is due when it has never run, or when at least `every_seconds`
//! have elapsed since its last run. Missed ticks do not queue up: a task
//! that was due ten times while the process was paused runs once.

use serde::{Deserialize, Serialize};

use agrimart_core::Timestamp;

// ---------------------------------------------------------------------------
// TaskKind
// ---------------------------------------------------------------------------

/// The recurring jobs of the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Escalate unanswered disputes to admin review.
    DisputeEscalation,
    /// Confirm receipt of delivered orders the buyer never confirmed.
    OrderAutoConfirmation,
}

impl TaskKind {
    /// Both sweeps, in run order.
    pub const ALL: [TaskKind; 2] = [Self::DisputeEscalation, Self::OrderAutoConfirmation];

    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DisputeEscalation => "dispute_escalation",
            Self::OrderAutoConfirmation => "order_auto_confirmation",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecurringTask
// ---------------------------------------------------------------------------

/// One recurring task and its run history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTask {
    pub kind: TaskKind,
    pub description: String,
    pub every_seconds: u32,
    pub active: bool,
    pub last_run: Option<Timestamp>,
    pub runs: u64,
    /// Error of the most recent failed run, cleared by a successful run.
    pub last_error: Option<String>,
}

impl RecurringTask {
    /// Create an active task that has never run.
    pub fn new(kind: TaskKind, description: impl Into<String>, every_seconds: u32) -> Self {
        Self {
            kind,
            description: description.into(),
            every_seconds,
            active: true,
            last_run: None,
            runs: 0,
            last_error: None,
        }
    }

    /// Check whether this task should run at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        if !self.active {
            return false;
        }
        match self.last_run {
            Some(last) => now.seconds_since(&last) >= i64::from(self.every_seconds),
            None => true,
        }
    }

    /// Record a run at `at`.
    pub fn mark_ran(&mut self, at: Timestamp) {
        self.last_run = Some(at);
        self.runs += 1;
    }

    /// Record the outcome of the latest run.
    pub fn record_result(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}

// ---------------------------------------------------------------------------
// TaskScheduler
// ---------------------------------------------------------------------------

/// Holds the recurring tasks and hands out the due ones.
#[derive(Debug, Clone, Default)]
pub struct TaskScheduler {
    tasks: Vec<RecurringTask>,
}

impl TaskScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// The two marketplace sweeps on a shared cadence.
    pub fn with_sweeps(every_seconds: u32) -> Self {
        let mut scheduler = Self::new();
        scheduler.add(RecurringTask::new(
            TaskKind::DisputeEscalation,
            "escalate disputes with no seller response past the deadline",
            every_seconds,
        ));
        scheduler.add(RecurringTask::new(
            TaskKind::OrderAutoConfirmation,
            "confirm receipt of orders delivered longer than the receipt window",
            every_seconds,
        ));
        scheduler
    }

    /// Add a task. A task of the same kind is replaced.
    pub fn add(&mut self, task: RecurringTask) {
        self.tasks.retain(|t| t.kind != task.kind);
        self.tasks.push(task);
    }

    /// Look up a task.
    pub fn task(&self, kind: TaskKind) -> Option<&RecurringTask> {
        self.tasks.iter().find(|t| t.kind == kind)
    }

    /// All tasks.
    pub fn tasks(&self) -> &[RecurringTask] {
        &self.tasks
    }

    /// Change the cadence of every task.
    pub fn set_interval(&mut self, every_seconds: u32) {
        for task in &mut self.tasks {
            task.every_seconds = every_seconds;
        }
    }

    /// Enable or disable a task.
    pub fn set_active(&mut self, kind: TaskKind, active: bool) -> bool {
        match self.tasks.iter_mut().find(|t| t.kind == kind) {
            Some(task) => {
                task.active = active;
                true
            }
            None => false,
        }
    }

    /// Return the tasks due at `now` and mark them as run.
    pub fn take_due(&mut self, now: Timestamp) -> Vec<TaskKind> {
        let mut due = Vec::new();
        for task in &mut self.tasks {
            if task.is_due(now) {
                task.mark_ran(now);
                due.push(task.kind);
            }
        }
        due
    }

    /// Record the outcome of a run.
    pub fn record_result(&mut self, kind: TaskKind, error: Option<String>) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.kind == kind) {
            task.record_result(error);
        }
    }
}
