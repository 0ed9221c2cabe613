//! Errors reported by history and notification sinks.

use thiserror::Error;

/// A sink could not accept a record.
///
/// Sink failures never roll back a committed transition; the dispatcher
/// logs them and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The backing channel is down (mail relay, push service, store).
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    /// The record was refused (bad address, payload too large).
    #[error("record rejected: {0}")]
    Rejected(String),
}
