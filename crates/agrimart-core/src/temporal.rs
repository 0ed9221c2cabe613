//! # Temporal Types - UTC Timestamps and Clocks
//!
//! Defines `Timestamp`, a UTC-only timestamp truncated to seconds, and the
//! [`Clock`] trait through which services obtain "now".
//!
//! ## Why seconds
//!
//! Every timer in the marketplace is expressed in whole minutes. Truncating
//! to seconds keeps stored records stable across serialization round trips
//! while still letting the delivery gate report a precise remaining wait.
//!
//! ## Clocks
//!
//! - [`SystemClock`] reads `Utc::now()`.
//! - [`ManualClock`] is set and advanced explicitly; sweeps and timing gates
//!   are tested with it instead of sleeping.

use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string. Only the `Z` suffix is accepted.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp {
                value: s.to_string(),
                reason: "must use Z suffix (UTC only)".to_string(),
            });
        }

        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| ValidationError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// This instant shifted forward by `minutes` (backward if negative).
    pub fn plus_minutes(&self, minutes: i64) -> Self {
        self.shifted(minutes.saturating_mul(60))
    }

    /// This instant shifted forward by `seconds` (backward if negative).
    pub fn plus_seconds(&self, seconds: i64) -> Self {
        self.shifted(seconds)
    }

    /// This instant shifted forward by `days`.
    pub fn plus_days(&self, days: i64) -> Self {
        self.shifted(days.saturating_mul(86_400))
    }

    /// Shift by `seconds`, clamping to the representable range.
    fn shifted(&self, seconds: i64) -> Self {
        let moved = Duration::try_seconds(seconds).and_then(|d| self.0.checked_add_signed(d));
        match moved {
            Some(dt) => Self(dt),
            None if seconds < 0 => Self(truncate_to_seconds(DateTime::<Utc>::MIN_UTC)),
            None => Self(truncate_to_seconds(DateTime::<Utc>::MAX_UTC)),
        }
    }

    /// Whole seconds elapsed from `earlier` to `self`. Negative if `earlier`
    /// is in the future.
    pub fn seconds_since(&self, earlier: &Timestamp) -> i64 {
        (self.0 - earlier.0).num_seconds()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Truncate a `DateTime<Utc>` to seconds precision (discard nanoseconds).
fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<RwLock<Timestamp>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(RwLock::new(start)),
        }
    }

    /// Move the clock to `at`.
    pub fn set(&self, at: Timestamp) {
        *self.current.write() = at;
    }

    /// Advance the clock by `minutes`.
    pub fn advance_minutes(&self, minutes: i64) {
        let mut current = self.current.write();
        *current = current.plus_minutes(minutes);
    }

    /// Advance the clock by `seconds`.
    pub fn advance_seconds(&self, seconds: i64) {
        let mut current = self.current.write();
        *current = current.plus_seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.read()
    }
}
