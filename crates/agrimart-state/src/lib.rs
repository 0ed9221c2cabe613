//! # agrimart-state - Order Lifecycle State Machines
//!
//! The order aggregate and the rules that move it.
//!
//! ## Modules
//!
//! - **Status** (`status.rs`): line-item, order, payment and dispute-mirror
//!   vocabularies, the allowed-next table, and the pure order status
//!   derivation.
//!
//! - **Order** (`order.rs`): the aggregate. Placement, per-item transitions
//!   with the delivery timing gate, seller acceptance and rejection,
//!   customer cancellation, and receipt confirmation (manual and automatic).
//!
//! - **Events** (`events.rs`): the outbox of domain events emitted by
//!   successful mutations.
//!
//! ## Design
//!
//! States are validated enums rather than typestate types. An order holds
//! items in different statuses at the same time, and the status a caller
//! asks for arrives at runtime, so every transition returns a `Result`
//! naming the current status and the allowed next set.

pub mod error;
pub mod events;
pub mod order;
pub mod status;

pub use error::OrderError;
pub use events::DomainEvent;
pub use order::{LineItem, NewLineItem, Order};
pub use status::{
    derive_order_status, DisputeStatus, ItemStatus, OrderStatus, PaymentMethod, PaymentStatus,
    RulingDecision,
};
