//! # Market State
//!
//! Shared record storage for the marketplace service.
//!
//! ## Layout
//!
//! An order and every dispute raised on it live in one [`OrderFile`]. A
//! dispute transition and the mirror update on its order therefore happen
//! under a single store lock and commit together.
//!
//! A secondary index maps dispute ids to their order so dispute operations
//! can find the file without scanning.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agrimart_arbitration::Dispute;
use agrimart_core::{DisputeId, OrderId};
use agrimart_state::Order;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous. The lock is never held across an
/// `.await` point, and `parking_lot::RwLock` does not poison on panic.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure runs under a single write lock and may inspect, validate
    /// and mutate the record. Returns `None` if the record doesn't exist.
    pub fn try_update<R, E>(&self, id: &Uuid, f: impl FnOnce(&mut T) -> Result<R, E>) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Records ------------------------------------------------------------------

/// An order together with its disputes, oldest dispute first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFile {
    pub order: Order,
    #[serde(default)]
    pub disputes: Vec<Dispute>,
}

impl OrderFile {
    /// A file for a newly placed order.
    pub fn new(order: Order) -> Self {
        Self {
            order,
            disputes: Vec::new(),
        }
    }

    /// The open or escalated dispute, if any.
    pub fn active_dispute(&self) -> Option<&Dispute> {
        self.disputes.iter().find(|d| d.is_active())
    }

    /// Look up one dispute.
    pub fn dispute(&self, id: DisputeId) -> Option<&Dispute> {
        self.disputes.iter().find(|d| d.id == id)
    }

    /// Borrow the order and one of its disputes mutably at the same time.
    pub fn split_mut(&mut self, id: DisputeId) -> Option<(&mut Order, &mut Dispute)> {
        let Self { order, disputes } = self;
        disputes.iter_mut().find(|d| d.id == id).map(|d| (order, d))
    }
}

// -- MarketState --------------------------------------------------------------

/// Order files plus the dispute index.
#[derive(Debug, Clone, Default)]
pub struct MarketState {
    pub orders: Store<OrderFile>,
    dispute_index: Arc<RwLock<HashMap<DisputeId, OrderId>>>,
}

impl MarketState {
    /// Create empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from previously saved files.
    pub fn from_files(files: impl IntoIterator<Item = OrderFile>) -> Self {
        let state = Self::new();
        for file in files {
            state.insert_file(file);
        }
        state
    }

    /// Store a file and index its disputes.
    pub fn insert_file(&self, file: OrderFile) {
        let order_id = file.order.id;
        {
            let mut index = self.dispute_index.write();
            for dispute in &file.disputes {
                index.insert(dispute.id, order_id);
            }
        }
        self.orders.insert(*order_id.as_uuid(), file);
    }

    /// Record that `dispute_id` lives in `order_id`'s file.
    pub fn index_dispute(&self, dispute_id: DisputeId, order_id: OrderId) {
        self.dispute_index.write().insert(dispute_id, order_id);
    }

    /// The order a dispute belongs to.
    pub fn order_for_dispute(&self, dispute_id: DisputeId) -> Option<OrderId> {
        self.dispute_index.read().get(&dispute_id).copied()
    }

    /// A copy of one file.
    pub fn file(&self, order_id: OrderId) -> Option<OrderFile> {
        self.orders.get(order_id.as_uuid())
    }

    /// A copy of every file, ordered by creation time.
    pub fn files(&self) -> Vec<OrderFile> {
        let mut files = self.orders.list();
        files.sort_by_key(|f| (f.order.created_at, *f.order.id.as_uuid()));
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrimart_core::{Customer, CustomerKind, ProductId, Seller, Timestamp, UserId};
    use agrimart_state::{NewLineItem, PaymentMethod};

    fn order() -> Order {
        Order::place(
            Customer {
                id: UserId::new(),
                kind: CustomerKind::Buyer,
            },
            vec![NewLineItem {
                product_id: ProductId::new(),
                quantity: 1,
                unit_price: 250,
                seller: Seller::Farmer(UserId::new()),
                estimated_delivery: None,
            }],
            PaymentMethod::Prepaid,
            Timestamp::now(),
        )
        .unwrap()
    }

    #[test]
    fn store_try_update_missing_returns_none() {
        let store: Store<u32> = Store::new();
        let out: Option<Result<(), ()>> = store.try_update(&Uuid::new_v4(), |_| Ok(()));
        assert!(out.is_none());
    }

    #[test]
    fn store_try_update_error_keeps_value() {
        let store: Store<u32> = Store::new();
        let id = Uuid::new_v4();
        store.insert(id, 7);
        let out: Option<Result<(), &str>> = store.try_update(&id, |_| Err("rejected"));
        assert_eq!(out, Some(Err("rejected")));
        assert_eq!(store.get(&id), Some(7));
    }

    #[test]
    fn clones_share_data() {
        let state = MarketState::new();
        let other = state.clone();
        let file = OrderFile::new(order());
        let id = file.order.id;
        state.insert_file(file);
        assert!(other.file(id).is_some());
        assert_eq!(other.orders.len(), 1);
    }

    #[test]
    fn dispute_index_round_trip() {
        let state = MarketState::new();
        let order_id = OrderId::new();
        let dispute_id = DisputeId::new();
        assert!(state.order_for_dispute(dispute_id).is_none());
        state.index_dispute(dispute_id, order_id);
        assert_eq!(state.order_for_dispute(dispute_id), Some(order_id));
    }

    #[test]
    fn file_without_disputes_has_no_active_dispute() {
        let file = OrderFile::new(order());
        assert!(file.active_dispute().is_none());
        assert!(file.dispute(DisputeId::new()).is_none());
    }
}
