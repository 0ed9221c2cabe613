//! # agrimart-agentic - Marketplace Automation
//!
//! The parts of the marketplace that act without a user request.
//!
//! ## Components
//!
//! - **Scheduler** ([`scheduler`]): recurring tasks on a fixed cadence.
//!   Pure bookkeeping, driven by the worker in `agrimart-market`.
//!
//! - **Sweeps** ([`sweep`]): candidate selection for dispute escalation and
//!   order auto-confirmation, pure over `(records, now, config)`.
//!
//! - **History trail** ([`audit`]): a SHA-256 hash-chained record of every
//!   order, payment and dispute change.
//!
//! - **Dispatch** ([`dispatch`]): routes committed domain events to the
//!   history and notification sinks. Sink failures are logged and never
//!   propagate.

pub mod audit;
pub mod dispatch;
pub mod error;
pub mod scheduler;
pub mod sweep;

pub use audit::{ChainIntegrity, ChainedEntry, HistoryChange, HistoryEntry, HistorySink, HistoryTrail, GENESIS_HASH};
pub use dispatch::{
    notifications_for, DispatchReport, EventDispatcher, Notification, NotificationKind, NotificationSink, Priority,
    RecordingNotifier, RelatedType, TracingNotifier,
};
pub use error::SinkError;
pub use scheduler::{RecurringTask, TaskKind, TaskScheduler};
pub use sweep::{select_due_confirmations, select_overdue_disputes, SweepOutcome, SweepReport};
