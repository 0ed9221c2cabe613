//! # Domain Events
//!
//! Aggregates append events to an outbox while a mutation runs. The caller
//! commits the aggregate first and only then drains the outbox, so a failed
//! notification can never roll back or corrupt a transition.

use serde::{Deserialize, Serialize};

use agrimart_core::{Actor, Customer, DisputeId, OrderId, ProductId, Seller, Timestamp};

use crate::status::{ItemStatus, OrderStatus, PaymentStatus, RulingDecision};

/// Something that happened to an order or its dispute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    OrderPlaced {
        order_id: OrderId,
        customer: Customer,
        sellers: Vec<Seller>,
        at: Timestamp,
    },
    ItemTransitioned {
        order_id: OrderId,
        product_id: ProductId,
        seller: Seller,
        customer: Customer,
        from: ItemStatus,
        to: ItemStatus,
        /// `None` when a scheduled sweep made the change.
        actor: Option<Actor>,
        reason: Option<String>,
        at: Timestamp,
    },
    /// Stock reserved at placement must go back to the catalog.
    StockReleased {
        order_id: OrderId,
        product_id: ProductId,
        quantity: u32,
    },
    OrderStatusChanged {
        order_id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        actor: Option<Actor>,
        at: Timestamp,
    },
    PaymentStatusChanged {
        order_id: OrderId,
        from: PaymentStatus,
        to: PaymentStatus,
        actor: Option<Actor>,
        at: Timestamp,
    },
    ReceiptConfirmed {
        order_id: OrderId,
        customer: Customer,
        sellers: Vec<Seller>,
        automatic: bool,
        at: Timestamp,
    },
    DisputeOpened {
        order_id: OrderId,
        dispute_id: DisputeId,
        customer: Customer,
        seller: Seller,
        response_deadline: Timestamp,
        at: Timestamp,
    },
    DisputeResponded {
        order_id: OrderId,
        dispute_id: DisputeId,
        customer: Customer,
        seller: Seller,
        at: Timestamp,
    },
    DisputeResolvedByBuyer {
        order_id: OrderId,
        dispute_id: DisputeId,
        customer: Customer,
        seller: Seller,
        accepted: bool,
        at: Timestamp,
    },
    DisputeEscalated {
        order_id: OrderId,
        dispute_id: DisputeId,
        customer: Customer,
        seller: Seller,
        at: Timestamp,
    },
    DisputeRuled {
        order_id: OrderId,
        dispute_id: DisputeId,
        customer: Customer,
        seller: Seller,
        decision: RulingDecision,
        admin: Actor,
        at: Timestamp,
    },
}

impl DomainEvent {
    /// The order every event belongs to.
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::OrderPlaced { order_id, .. }
            | Self::ItemTransitioned { order_id, .. }
            | Self::StockReleased { order_id, .. }
            | Self::OrderStatusChanged { order_id, .. }
            | Self::PaymentStatusChanged { order_id, .. }
            | Self::ReceiptConfirmed { order_id, .. }
            | Self::DisputeOpened { order_id, .. }
            | Self::DisputeResponded { order_id, .. }
            | Self::DisputeResolvedByBuyer { order_id, .. }
            | Self::DisputeEscalated { order_id, .. }
            | Self::DisputeRuled { order_id, .. } => *order_id,
        }
    }

    /// Short snake_case label, used as the history change type and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "order_placed",
            Self::ItemTransitioned { .. } => "item_status",
            Self::StockReleased { .. } => "stock_released",
            Self::OrderStatusChanged { .. } => "order_status",
            Self::PaymentStatusChanged { .. } => "payment_status",
            Self::ReceiptConfirmed { .. } => "receipt_confirmed",
            Self::DisputeOpened { .. } => "dispute_opened",
            Self::DisputeResponded { .. } => "dispute_responded",
            Self::DisputeResolvedByBuyer { .. } => "dispute_buyer_resolution",
            Self::DisputeEscalated { .. } => "dispute_escalated",
            Self::DisputeRuled { .. } => "dispute_ruled",
        }
    }
}
