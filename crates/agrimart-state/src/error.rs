//! Errors raised by the order state machine.

use thiserror::Error;

use agrimart_core::{OrderId, ProductId, ValidationError};

use crate::status::{DisputeStatus, ItemStatus, OrderStatus};

/// Errors that can occur during order lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Requested status is not reachable from the current one.
    #[error("invalid item transition: {from} -> {to} (allowed: {allowed})")]
    InvalidTransition {
        /// Current item status.
        from: ItemStatus,
        /// Requested status.
        to: ItemStatus,
        /// Comma-separated allowed next statuses.
        allowed: String,
    },

    /// The item is in a status no workflow transition leaves.
    #[error("item {product_id} is {status} and cannot change status")]
    TerminalState {
        /// The product line.
        product_id: ProductId,
        /// Its terminal status.
        status: ItemStatus,
    },

    /// An active dispute freezes the order.
    #[error("order {order_id} has an active dispute ({dispute_status}); status changes are blocked")]
    DisputeActive {
        /// The order.
        order_id: OrderId,
        /// The blocking dispute status.
        dispute_status: DisputeStatus,
    },

    /// Delivery attempted before the minimum dwell time in `shipped`.
    #[error("item cannot be marked delivered yet: wait {remaining_minutes} more {}", minute_unit(.remaining_minutes))]
    DeliveryTooEarly {
        /// Whole minutes still to wait, rounded up.
        remaining_minutes: i64,
    },

    /// A shipped item has no shipment timestamp.
    #[error("item {product_id} has no shipment time recorded")]
    MissingShipmentTime {
        /// The product line.
        product_id: ProductId,
    },

    /// The order has no line for this product.
    #[error("order {order_id} has no item for {product_id}")]
    ItemNotFound {
        /// The order.
        order_id: OrderId,
        /// The missing product.
        product_id: ProductId,
    },

    /// The caller does not own what they are acting on.
    #[error("{actor} is not permitted to {action}")]
    Forbidden {
        /// Display form of the caller.
        actor: String,
        /// What was attempted.
        action: &'static str,
    },

    /// The seller has no pending, unanswered items in the order.
    #[error("order {order_id} has no pending items awaiting this seller's decision")]
    NothingPending {
        /// The order.
        order_id: OrderId,
    },

    /// No item of the order can still be cancelled.
    #[error("order {order_id} has no items that can still be cancelled")]
    NothingToCancel {
        /// The order.
        order_id: OrderId,
    },

    /// Receipt confirmation requires every live item to be delivered.
    #[error("order {order_id} is {status}; receipt can only be confirmed once delivered")]
    NotAwaitingReceipt {
        /// The order.
        order_id: OrderId,
        /// Its current derived status.
        status: OrderStatus,
    },

    /// The automatic receipt window has not elapsed.
    #[error("order {order_id} is not due for automatic confirmation")]
    AutoConfirmNotDue {
        /// The order.
        order_id: OrderId,
    },

    /// Malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn minute_unit(n: &i64) -> &'static str {
    if *n == 1 {
        "minute"
    } else {
        "minutes"
    }
}
