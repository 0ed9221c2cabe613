//! # Order History Trail
//!
//! Records every order, payment and dispute change for later review.
//!
//! ## Integrity
//!
//! Entries are chained: each stored entry carries the hash of its
//! predecessor and its own hash over `previous_hash || canonical JSON of
//! the entry`. [`HistoryTrail::verify_chain`] recomputes every hash and
//! counts broken links, so an edited or dropped entry is detectable.
//!
//! ## Capacity
//!
//! The in-memory trail trims the oldest 10% once it exceeds its configured
//! maximum. The first retained entry keeps its original `previous_hash`, so
//! verification of the retained suffix still succeeds.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use agrimart_core::{Actor, OrderId, Timestamp};
use agrimart_state::DomainEvent;

use crate::error::SinkError;

/// Hash used as the predecessor of the very first entry.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// ---------------------------------------------------------------------------
// HistoryChange
// ---------------------------------------------------------------------------

/// The kind of change recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryChange {
    OrderPlaced,
    ItemStatus,
    OrderStatus,
    PaymentStatus,
    ReceiptConfirmed,
    DisputeStatus,
}

impl HistoryChange {
    /// Return the string value for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderPlaced => "order_placed",
            Self::ItemStatus => "item_status",
            Self::OrderStatus => "order_status",
            Self::PaymentStatus => "payment_status",
            Self::ReceiptConfirmed => "receipt_confirmed",
            Self::DisputeStatus => "dispute_status",
        }
    }
}

impl std::fmt::Display for HistoryChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HistoryEntry
// ---------------------------------------------------------------------------

/// One recorded change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub order_id: OrderId,
    /// `None` when a scheduled sweep made the change.
    pub changed_by: Option<Actor>,
    pub change_type: HistoryChange,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub at: Timestamp,
}

impl HistoryEntry {
    fn new(order_id: OrderId, change_type: HistoryChange, at: Timestamp) -> Self {
        Self {
            order_id,
            changed_by: None,
            change_type,
            old_value: None,
            new_value: None,
            reason: None,
            notes: None,
            at,
        }
    }

    fn by(mut self, actor: Option<Actor>) -> Self {
        self.changed_by = actor;
        self
    }

    fn values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }

    fn notes(mut self, notes: String) -> Self {
        self.notes = Some(notes);
        self
    }

    /// The history record for an event, if the event is a recorded change.
    pub fn from_event(event: &DomainEvent) -> Option<Self> {
        let entry = match event {
            DomainEvent::OrderPlaced {
                order_id,
                customer,
                sellers,
                at,
            } => Self::new(*order_id, HistoryChange::OrderPlaced, *at)
                .values(None, Some("pending".to_string()))
                .notes(format!("placed by {} with {} seller(s)", customer.id, sellers.len())),
            DomainEvent::ItemTransitioned {
                order_id,
                product_id,
                from,
                to,
                actor,
                reason,
                at,
                ..
            } => {
                let mut e = Self::new(*order_id, HistoryChange::ItemStatus, *at)
                    .by(*actor)
                    .values(Some(from.to_string()), Some(to.to_string()))
                    .notes(product_id.to_string());
                e.reason = reason.clone();
                e
            }
            DomainEvent::OrderStatusChanged {
                order_id,
                from,
                to,
                actor,
                at,
            } => Self::new(*order_id, HistoryChange::OrderStatus, *at)
                .by(*actor)
                .values(Some(from.to_string()), Some(to.to_string())),
            DomainEvent::PaymentStatusChanged {
                order_id,
                from,
                to,
                actor,
                at,
            } => Self::new(*order_id, HistoryChange::PaymentStatus, *at)
                .by(*actor)
                .values(Some(from.to_string()), Some(to.to_string())),
            DomainEvent::ReceiptConfirmed {
                order_id,
                automatic,
                at,
                ..
            } => {
                let e = Self::new(*order_id, HistoryChange::ReceiptConfirmed, *at)
                    .values(Some("delivered".to_string()), Some("received".to_string()));
                if *automatic {
                    e.notes("confirmed automatically after the receipt window".to_string())
                } else {
                    e
                }
            }
            DomainEvent::DisputeOpened {
                order_id,
                dispute_id,
                at,
                ..
            } => Self::new(*order_id, HistoryChange::DisputeStatus, *at)
                .values(Some("none".to_string()), Some("open".to_string()))
                .notes(dispute_id.to_string()),
            DomainEvent::DisputeResolvedByBuyer {
                order_id,
                dispute_id,
                accepted,
                at,
                ..
            } => {
                let new = if *accepted { "closed" } else { "pending_admin_review" };
                Self::new(*order_id, HistoryChange::DisputeStatus, *at)
                    .values(Some("open".to_string()), Some(new.to_string()))
                    .notes(dispute_id.to_string())
            }
            DomainEvent::DisputeEscalated {
                order_id,
                dispute_id,
                at,
                ..
            } => Self::new(*order_id, HistoryChange::DisputeStatus, *at)
                .values(Some("open".to_string()), Some("pending_admin_review".to_string()))
                .notes(format!("{dispute_id}: no seller response before the deadline")),
            DomainEvent::DisputeRuled {
                order_id,
                dispute_id,
                decision,
                admin,
                at,
                ..
            } => Self::new(*order_id, HistoryChange::DisputeStatus, *at)
                .by(Some(*admin))
                .values(Some("pending_admin_review".to_string()), Some("closed".to_string()))
                .notes(format!("{dispute_id}: {decision}")),
            DomainEvent::DisputeResponded { .. } | DomainEvent::StockReleased { .. } => return None,
        };
        Some(entry)
    }
}

// ---------------------------------------------------------------------------
// Sink contract
// ---------------------------------------------------------------------------

/// Receives history entries.
pub trait HistorySink: Send + Sync {
    /// Store one entry.
    fn record(&self, entry: HistoryEntry) -> Result<(), SinkError>;
}

// ---------------------------------------------------------------------------
// HistoryTrail
// ---------------------------------------------------------------------------

/// A stored entry with its chain hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainedEntry {
    pub entry: HistoryEntry,
    pub previous_hash: String,
    pub entry_hash: String,
}

/// Result of chain integrity verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainIntegrity {
    pub total_entries: usize,
    pub broken_links: usize,
    pub chain_valid: bool,
}

/// An append-only, hash-chained history trail with a configurable capacity.
#[derive(Debug)]
pub struct HistoryTrail {
    inner: Mutex<TrailInner>,
}

#[derive(Debug)]
struct TrailInner {
    entries: Vec<ChainedEntry>,
    max_entries: usize,
}

impl HistoryTrail {
    /// Create a trail holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(TrailInner {
                entries: Vec::new(),
                max_entries: max_entries.max(1),
            }),
        }
    }

    /// Append an entry and return its hash.
    pub fn append(&self, entry: HistoryEntry) -> String {
        let mut inner = self.inner.lock();
        let previous_hash = inner
            .entries
            .last()
            .map(|e| e.entry_hash.clone())
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let entry_hash = chain_hash(&previous_hash, &entry);
        inner.entries.push(ChainedEntry {
            entry,
            previous_hash,
            entry_hash: entry_hash.clone(),
        });
        if inner.entries.len() > inner.max_entries {
            let trim_count = (inner.max_entries / 10).max(1);
            inner.entries.drain(..trim_count);
        }
        entry_hash
    }

    /// A copy of every retained entry, oldest first.
    pub fn entries(&self) -> Vec<ChainedEntry> {
        self.inner.lock().entries.clone()
    }

    /// Entries for one order, oldest first.
    pub fn for_order(&self, order_id: OrderId) -> Vec<HistoryEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.entry.order_id == order_id)
            .map(|e| e.entry.clone())
            .collect()
    }

    /// Return the number of retained entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Return whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Verify hash continuity of the retained entries.
    pub fn verify_chain(&self) -> ChainIntegrity {
        verify_entries(&self.inner.lock().entries)
    }
}

impl Default for HistoryTrail {
    fn default() -> Self {
        Self::new(100_000)
    }
}

impl HistorySink for HistoryTrail {
    fn record(&self, entry: HistoryEntry) -> Result<(), SinkError> {
        self.append(entry);
        Ok(())
    }
}

/// Verify a sequence of chained entries.
pub fn verify_entries(entries: &[ChainedEntry]) -> ChainIntegrity {
    let mut broken_links = 0;
    let mut last_hash: Option<&str> = None;
    for stored in entries {
        if let Some(expected_prev) = last_hash {
            if stored.previous_hash != expected_prev {
                broken_links += 1;
            }
        }
        if chain_hash(&stored.previous_hash, &stored.entry) != stored.entry_hash {
            broken_links += 1;
        }
        last_hash = Some(&stored.entry_hash);
    }
    ChainIntegrity {
        total_entries: entries.len(),
        broken_links,
        chain_valid: broken_links == 0,
    }
}

/// SHA-256 hex of `previous_hash || canonical JSON of entry`.
fn chain_hash(previous_hash: &str, entry: &HistoryEntry) -> String {
    let body = match serde_json::to_string(entry) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "history entry serialization failed; hashing debug form");
            format!("{entry:?}")
        }
    };
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(body.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
