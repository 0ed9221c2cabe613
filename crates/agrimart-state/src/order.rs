//! # Order Aggregate
//!
//! One aggregate covers both single-seller and multi-seller orders: a
//! single-seller order is simply an order whose items share one [`Seller`].
//!
//! ## Invariants
//!
//! - `order_status` always equals [`derive_order_status`] over the items.
//!   Every mutation ends with a recompute; nothing assigns it directly.
//! - While `dispute_status` is `open` or `pending_admin_review`, no item or
//!   order status changes through the workflow methods.
//! - `shipped_at`, `delivered_at` and `received_at` are each set at most once.
//! - Prices are snapshotted at placement and never change.
//!
//! ## Outbox
//!
//! Each successful mutation appends [`DomainEvent`]s. Callers persist the
//! order, then call [`Order::take_events`] and hand the events to a
//! dispatcher. Failed mutations must be discarded together with whatever
//! they appended; the service layer does this by mutating a clone.

use serde::{Deserialize, Serialize};

use agrimart_core::{
    Actor, Customer, MarketConfig, OrderId, ProductId, Seller, Timestamp, ValidationError,
};

use crate::error::OrderError;
use crate::events::DomainEvent;
use crate::status::{
    derive_order_status, format_statuses, DisputeStatus, ItemStatus, OrderStatus, PaymentMethod,
    PaymentStatus,
};

// ─── Line Items ──────────────────────────────────────────────────────

/// Input for one line of a new order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price in minor currency units, as listed at order time.
    pub unit_price: u64,
    pub seller: Seller,
    pub estimated_delivery: Option<Timestamp>,
}

/// One seller's product quantity within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: u64,
    pub seller: Seller,
    pub status: ItemStatus,
    /// `None` until the seller accepts or rejects.
    pub seller_accepted: Option<bool>,
    pub estimated_delivery: Option<Timestamp>,
    pub shipped_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub rejected_at: Option<Timestamp>,
    pub rejection_reason: Option<String>,
}

impl LineItem {
    fn from_new(line: NewLineItem) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            seller: line.seller,
            status: ItemStatus::Pending,
            seller_accepted: None,
            estimated_delivery: line.estimated_delivery,
            shipped_at: None,
            delivered_at: None,
            rejected_at: None,
            rejection_reason: None,
        }
    }

    /// Quantity times unit price.
    pub fn subtotal(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }

    /// Pending and not yet answered by its seller.
    pub fn awaits_seller(&self) -> bool {
        self.status == ItemStatus::Pending && self.seller_accepted.is_none()
    }
}

// ─── Order ───────────────────────────────────────────────────────────

/// An order and its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub paid_at: Option<Timestamp>,
    pub dispute_status: DisputeStatus,
    pub expected_delivery_date: Option<Timestamp>,
    pub shipped_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub received_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Bumped on every committed mutation.
    pub version: u64,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Order {
    /// Create an order with every item `pending`.
    ///
    /// Repeated lines for the same product are merged. Lines for the same
    /// product with a different seller or price are rejected.
    pub fn place(
        customer: Customer,
        lines: Vec<NewLineItem>,
        payment_method: PaymentMethod,
        now: Timestamp,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(ValidationError::EmptyField { field: "products" }.into());
        }

        let mut items: Vec<LineItem> = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity == 0 {
                return Err(ValidationError::InvalidQuantity(0).into());
            }
            match items.iter_mut().find(|i| i.product_id == line.product_id) {
                Some(existing) if existing.seller == line.seller && existing.unit_price == line.unit_price => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                Some(_) => {
                    return Err(ValidationError::InconsistentLine(line.product_id.to_string()).into());
                }
                None => items.push(LineItem::from_new(line)),
            }
        }

        let id = OrderId::new();
        let mut order = Self {
            id,
            customer,
            order_status: derive_order_status(items.iter().map(|i| i.status)),
            items,
            payment_method,
            payment_status: PaymentStatus::Pending,
            paid_at: None,
            dispute_status: DisputeStatus::None,
            expected_delivery_date: None,
            shipped_at: None,
            delivered_at: None,
            received_at: None,
            created_at: now,
            updated_at: now,
            version: 1,
            events: Vec::new(),
        };
        let sellers = order.sellers();
        order.events.push(DomainEvent::OrderPlaced {
            order_id: id,
            customer,
            sellers,
            at: now,
        });
        Ok(order)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The line for `product_id`.
    pub fn item(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Distinct sellers, in item order.
    pub fn sellers(&self) -> Vec<Seller> {
        let mut out: Vec<Seller> = Vec::new();
        for item in &self.items {
            if !out.contains(&item.seller) {
                out.push(item.seller);
            }
        }
        out
    }

    /// The seller, when every item belongs to the same one.
    pub fn sole_seller(&self) -> Option<Seller> {
        match self.sellers().as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Whether `seller` owns at least one item.
    pub fn has_seller(&self, seller: &Seller) -> bool {
        self.items.iter().any(|i| i.seller == *seller)
    }

    /// Sum of line subtotals.
    pub fn total(&self) -> u64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Status derived over live (not rejected or cancelled) items only.
    /// `cancelled` when no live item remains.
    pub fn live_status(&self) -> OrderStatus {
        let live: Vec<ItemStatus> = self
            .items
            .iter()
            .map(|i| i.status)
            .filter(|s| !s.is_void())
            .collect();
        if live.is_empty() {
            return OrderStatus::Cancelled;
        }
        derive_order_status(live)
    }

    /// Every live item is delivered and at least one exists.
    pub fn is_awaiting_receipt(&self) -> bool {
        self.received_at.is_none() && self.live_status() == OrderStatus::Delivered
    }

    /// Every item is rejected or cancelled.
    pub fn is_fully_void(&self) -> bool {
        self.items.iter().all(|i| i.status.is_void())
    }

    /// Latest delivery time across items.
    pub fn last_delivered_at(&self) -> Option<Timestamp> {
        self.items.iter().filter_map(|i| i.delivered_at).max()
    }

    /// Whether the automatic receipt window has elapsed.
    pub fn is_due_for_auto_confirm(&self, now: Timestamp, config: &MarketConfig) -> bool {
        if self.dispute_status.blocks_workflow() || !self.is_awaiting_receipt() {
            return false;
        }
        let window = i64::from(config.delivered_to_received_minutes) * 60;
        self.last_delivered_at()
            .map(|at| now.seconds_since(&at) >= window)
            .unwrap_or(false)
    }

    /// Fail when an active dispute freezes the workflow.
    pub fn ensure_workflow_open(&self) -> Result<(), OrderError> {
        if self.dispute_status.blocks_workflow() {
            return Err(OrderError::DisputeActive {
                order_id: self.id,
                dispute_status: self.dispute_status,
            });
        }
        Ok(())
    }

    // ── Workflow ─────────────────────────────────────────────────────

    /// Move one line item to `requested`.
    ///
    /// The caller must be the item's seller or an admin. `rejected` needs a
    /// reason. `delivered` is refused until the configured dwell time in
    /// `shipped` has elapsed.
    pub fn transition_item(
        &mut self,
        product_id: ProductId,
        requested: ItemStatus,
        actor: &Actor,
        reason: Option<&str>,
        now: Timestamp,
        config: &MarketConfig,
    ) -> Result<(), OrderError> {
        self.ensure_workflow_open()?;
        let idx = self.item_index(product_id)?;
        let (current, owner, item_shipped_at) = {
            let item = &self.items[idx];
            (item.status, item.seller, item.shipped_at)
        };

        if !(owner.is(actor) || actor.is_admin()) {
            return Err(OrderError::Forbidden {
                actor: actor.to_string(),
                action: "change the status of this item",
            });
        }
        if current.is_terminal() {
            return Err(OrderError::TerminalState {
                product_id,
                status: current,
            });
        }
        if !current.can_transition_to(requested) {
            return Err(OrderError::InvalidTransition {
                from: current,
                to: requested,
                allowed: format_statuses(current.allowed_next()),
            });
        }

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        match requested {
            ItemStatus::Confirmed => {
                self.items[idx].seller_accepted = Some(true);
            }
            ItemStatus::Rejected => {
                let Some(text) = reason else {
                    return Err(ValidationError::EmptyField { field: "reason" }.into());
                };
                self.mark_rejected(idx, text, now);
            }
            ItemStatus::Cancelled => {
                self.release_stock(idx);
            }
            ItemStatus::Shipped => {
                self.stamp_shipped(idx, now, config);
            }
            ItemStatus::Delivered => {
                let shipped_at = item_shipped_at.ok_or(OrderError::MissingShipmentTime { product_id })?;
                let threshold = i64::from(config.shipped_to_delivered_minutes) * 60;
                let elapsed = now.seconds_since(&shipped_at);
                if elapsed < threshold {
                    let remaining = threshold - elapsed;
                    return Err(OrderError::DeliveryTooEarly {
                        remaining_minutes: (remaining + 59) / 60,
                    });
                }
                self.items[idx].delivered_at = Some(now);
                if self.delivered_at.is_none() {
                    self.delivered_at = Some(now);
                }
            }
            ItemStatus::Pending | ItemStatus::Processing | ItemStatus::Received => {}
        }

        let actor = Some(*actor);
        self.apply_item_status(idx, requested, actor, reason.map(str::to_string), now);
        if requested == ItemStatus::Rejected {
            self.advance_when_settled(actor, now);
        }
        if requested.is_void() {
            self.settle_if_void(actor, now);
        }
        self.refresh_status(actor, now);
        self.touch(now);
        tracing::debug!(order_id = %self.id, %product_id, to = %requested, "item transitioned");
        Ok(())
    }

    /// Accept every pending, unanswered item of the calling seller.
    ///
    /// Once nothing in the order is pending, confirmed items move on to
    /// `processing`. Returns the number of items accepted.
    pub fn accept(&mut self, actor: &Actor, now: Timestamp) -> Result<usize, OrderError> {
        self.ensure_workflow_open()?;
        let seller = self.require_seller(actor, "accept order items")?;
        let targets = self.awaiting(&seller)?;

        let who = Some(*actor);
        for &idx in &targets {
            self.items[idx].seller_accepted = Some(true);
            self.apply_item_status(idx, ItemStatus::Confirmed, who, None, now);
        }
        self.advance_when_settled(who, now);
        self.refresh_status(who, now);
        self.touch(now);
        Ok(targets.len())
    }

    /// Reject every pending, unanswered item of the calling seller.
    ///
    /// Rejected quantities are released. When every item of the order is
    /// void the payment settles per [`PaymentMethod::void_outcome`].
    pub fn reject(&mut self, actor: &Actor, reason: &str, now: Timestamp) -> Result<usize, OrderError> {
        self.ensure_workflow_open()?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::EmptyField { field: "reason" }.into());
        }
        let seller = self.require_seller(actor, "reject order items")?;
        let targets = self.awaiting(&seller)?;

        let who = Some(*actor);
        for &idx in &targets {
            self.mark_rejected(idx, reason, now);
            self.apply_item_status(idx, ItemStatus::Rejected, who, Some(reason.to_string()), now);
        }
        self.settle_if_void(who, now);
        self.advance_when_settled(who, now);
        self.refresh_status(who, now);
        self.touch(now);
        Ok(targets.len())
    }

    /// The customer withdraws every item that has not shipped yet.
    pub fn cancel(&mut self, actor: &Actor, now: Timestamp) -> Result<usize, OrderError> {
        self.require_customer(actor, "cancel this order")?;
        self.ensure_workflow_open()?;
        let targets: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.status.is_cancellable())
            .map(|(idx, _)| idx)
            .collect();
        if targets.is_empty() {
            return Err(OrderError::NothingToCancel { order_id: self.id });
        }

        let who = Some(*actor);
        for &idx in &targets {
            self.release_stock(idx);
            self.apply_item_status(
                idx,
                ItemStatus::Cancelled,
                who,
                Some("cancelled by customer".to_string()),
                now,
            );
        }
        self.settle_if_void(who, now);
        self.refresh_status(who, now);
        self.touch(now);
        Ok(targets.len())
    }

    /// The customer confirms receipt of a delivered order.
    pub fn confirm_receipt(&mut self, actor: &Actor, now: Timestamp) -> Result<(), OrderError> {
        self.require_customer(actor, "confirm receipt of this order")?;
        self.ensure_workflow_open()?;
        if !self.is_awaiting_receipt() {
            return Err(OrderError::NotAwaitingReceipt {
                order_id: self.id,
                status: self.order_status,
            });
        }
        self.apply_receipt(Some(*actor), false, now);
        Ok(())
    }

    /// Confirm receipt on the customer's behalf once the window has elapsed.
    pub fn auto_confirm(&mut self, now: Timestamp, config: &MarketConfig) -> Result<(), OrderError> {
        if !self.is_due_for_auto_confirm(now, config) {
            return Err(OrderError::AutoConfirmNotDue { order_id: self.id });
        }
        self.apply_receipt(None, true, now);
        Ok(())
    }

    // ── Dispute hooks ────────────────────────────────────────────────

    /// Mirror the dispute sub-machine's status onto the order.
    pub fn set_dispute_status(&mut self, status: DisputeStatus, now: Timestamp) {
        self.dispute_status = status;
        self.touch(now);
    }

    /// Set the payment axis. No-op when unchanged.
    pub fn set_payment_status(&mut self, to: PaymentStatus, actor: Option<Actor>, now: Timestamp) {
        let from = self.payment_status;
        if from == to {
            return;
        }
        self.payment_status = to;
        if to == PaymentStatus::Complete {
            self.paid_at = Some(now);
        }
        self.events.push(DomainEvent::PaymentStatusChanged {
            order_id: self.id,
            from,
            to,
            actor,
            at: now,
        });
    }

    /// Append an event to the outbox.
    pub fn push_event(&mut self, event: DomainEvent) {
        self.events.push(event);
    }

    /// Events recorded since the last drain.
    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    /// Drain the outbox.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn item_index(&self, product_id: ProductId) -> Result<usize, OrderError> {
        self.items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or(OrderError::ItemNotFound {
                order_id: self.id,
                product_id,
            })
    }

    fn require_seller(&self, actor: &Actor, action: &'static str) -> Result<Seller, OrderError> {
        actor
            .as_seller()
            .filter(|s| self.has_seller(s))
            .ok_or_else(|| OrderError::Forbidden {
                actor: actor.to_string(),
                action,
            })
    }

    fn require_customer(&self, actor: &Actor, action: &'static str) -> Result<(), OrderError> {
        if self.customer.is(actor) {
            Ok(())
        } else {
            Err(OrderError::Forbidden {
                actor: actor.to_string(),
                action,
            })
        }
    }

    fn awaiting(&self, seller: &Seller) -> Result<Vec<usize>, OrderError> {
        let targets: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.seller == *seller && i.awaits_seller())
            .map(|(idx, _)| idx)
            .collect();
        if targets.is_empty() {
            return Err(OrderError::NothingPending { order_id: self.id });
        }
        Ok(targets)
    }

    fn mark_rejected(&mut self, idx: usize, reason: &str, now: Timestamp) {
        let item = &mut self.items[idx];
        item.seller_accepted = Some(false);
        item.rejected_at = Some(now);
        item.rejection_reason = Some(reason.to_string());
        self.release_stock(idx);
    }

    fn release_stock(&mut self, idx: usize) {
        let item = &self.items[idx];
        self.events.push(DomainEvent::StockReleased {
            order_id: self.id,
            product_id: item.product_id,
            quantity: item.quantity,
        });
    }

    fn stamp_shipped(&mut self, idx: usize, now: Timestamp, config: &MarketConfig) {
        self.items[idx].shipped_at = Some(now);
        if self.shipped_at.is_none() {
            self.shipped_at = Some(now);
        }
        if self.expected_delivery_date.is_none() {
            let estimate = self.items[idx]
                .estimated_delivery
                .unwrap_or_else(|| now.plus_days(i64::from(config.default_delivery_estimate_days)));
            self.expected_delivery_date = Some(estimate);
        }
    }

    fn apply_item_status(
        &mut self,
        idx: usize,
        to: ItemStatus,
        actor: Option<Actor>,
        reason: Option<String>,
        now: Timestamp,
    ) {
        let item = &mut self.items[idx];
        let from = item.status;
        item.status = to;
        let (product_id, seller) = (item.product_id, item.seller);
        self.events.push(DomainEvent::ItemTransitioned {
            order_id: self.id,
            product_id,
            seller,
            customer: self.customer,
            from,
            to,
            actor,
            reason,
            at: now,
        });
    }

    /// Once no item awaits a decision, confirmed items start processing.
    fn advance_when_settled(&mut self, actor: Option<Actor>, now: Timestamp) {
        if self.items.iter().any(|i| i.status == ItemStatus::Pending) {
            return;
        }
        let confirmed: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.status == ItemStatus::Confirmed)
            .map(|(idx, _)| idx)
            .collect();
        for idx in confirmed {
            self.apply_item_status(idx, ItemStatus::Processing, actor, None, now);
        }
    }

    fn settle_if_void(&mut self, actor: Option<Actor>, now: Timestamp) {
        if self.is_fully_void() && self.payment_status == PaymentStatus::Pending {
            self.set_payment_status(self.payment_method.void_outcome(), actor, now);
        }
    }

    fn apply_receipt(&mut self, actor: Option<Actor>, automatic: bool, now: Timestamp) {
        let delivered: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.status == ItemStatus::Delivered)
            .map(|(idx, _)| idx)
            .collect();
        let mut sellers: Vec<Seller> = Vec::new();
        for idx in delivered {
            let seller = self.items[idx].seller;
            if !sellers.contains(&seller) {
                sellers.push(seller);
            }
            let reason = automatic.then(|| "confirmed automatically".to_string());
            self.apply_item_status(idx, ItemStatus::Received, actor, reason, now);
        }
        self.received_at = Some(now);
        self.refresh_status(actor, now);
        // a settled dispute already decided the payment
        if self.payment_status == PaymentStatus::Pending {
            self.set_payment_status(PaymentStatus::Complete, actor, now);
        }
        self.events.push(DomainEvent::ReceiptConfirmed {
            order_id: self.id,
            customer: self.customer,
            sellers,
            automatic,
            at: now,
        });
        self.touch(now);
    }

    fn refresh_status(&mut self, actor: Option<Actor>, now: Timestamp) {
        let derived = derive_order_status(self.items.iter().map(|i| i.status));
        if derived != self.order_status {
            self.events.push(DomainEvent::OrderStatusChanged {
                order_id: self.id,
                from: self.order_status,
                to: derived,
                actor,
                at: now,
            });
            self.order_status = derived;
        }
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
