//! # Arbitration Error Types
//!
//! State machine rejections carry the current state, the attempted target
//! and the reason, so operators can diagnose a refusal without logs.

use thiserror::Error;

use agrimart_core::{OrderId, ValidationError};
use agrimart_state::OrderStatus;

/// Errors arising from dispute operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbitrationError {
    /// Attempted transition is not valid from the current dispute state.
    #[error("invalid dispute transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// The current state name.
        from: String,
        /// The attempted target state name.
        to: String,
        /// Human-readable reason for the rejection.
        reason: String,
    },

    /// Dispute is closed and cannot accept further transitions.
    #[error("dispute {dispute_id} is in terminal state {state}")]
    TerminalState {
        /// The dispute identifier.
        dispute_id: String,
        /// The terminal state name.
        state: String,
    },

    /// The caller is not the party this operation belongs to.
    #[error("{actor} is not permitted to {action}")]
    Forbidden {
        /// Display form of the caller.
        actor: String,
        /// What was attempted.
        action: &'static str,
    },

    /// The order already has an open or escalated dispute.
    #[error("order {order_id} already has an active dispute")]
    AlreadyActive {
        /// The order.
        order_id: OrderId,
    },

    /// Disputes may only be raised once the order has shipped.
    #[error("order {order_id} is {status}; disputes require a shipped, delivered or received order")]
    OrderNotEligible {
        /// The order.
        order_id: OrderId,
        /// Its status at the time of the attempt.
        status: OrderStatus,
    },

    /// The dispute window after delivery or receipt has closed.
    #[error("order {order_id}: the {window_minutes}-minute dispute window has closed")]
    WindowClosed {
        /// The order.
        order_id: OrderId,
        /// Configured window length.
        window_minutes: u32,
    },

    /// A multi-seller order needs the disputed seller named.
    #[error("order {order_id} has several sellers; name the seller being disputed")]
    SellerRequired {
        /// The order.
        order_id: OrderId,
    },

    /// The named seller has no item in the order.
    #[error("the named seller has no items in order {order_id}")]
    SellerNotInOrder {
        /// The order.
        order_id: OrderId,
    },

    /// The seller has already responded.
    #[error("dispute {dispute_id} already has a seller response")]
    AlreadyResponded {
        /// The dispute identifier.
        dispute_id: String,
    },

    /// The buyer cannot resolve before the seller has responded.
    #[error("dispute {dispute_id} has no seller response to accept or reject")]
    AwaitingSellerResponse {
        /// The dispute identifier.
        dispute_id: String,
    },

    /// Escalation requested before the response deadline, or after a response.
    #[error("dispute {dispute_id} is not due for escalation")]
    NotOverdue {
        /// The dispute identifier.
        dispute_id: String,
    },

    /// The order passed in is not the disputed order.
    #[error("dispute {dispute_id} belongs to {expected}, not {actual}")]
    OrderMismatch {
        /// The dispute identifier.
        dispute_id: String,
        /// The dispute's order.
        expected: OrderId,
        /// The order supplied.
        actual: OrderId,
    },

    /// Malformed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
