//! # agrimart-arbitration - Dispute Resolution
//!
//! The three-party dispute protocol between a buyer, the disputed seller,
//! and a marketplace admin.
//!
//! ## Protocol
//!
//! 1. The buyer opens a dispute against a shipped, delivered or received
//!    order, within the configured window.
//! 2. The seller responds once, with evidence and a proposal.
//! 3. The buyer accepts (dispute closes, payment completes) or rejects
//!    (dispute goes to admin review).
//! 4. An unanswered dispute is escalated to admin review by the sweep once
//!    the response deadline passes.
//! 5. The admin rules `buyer_win` (refund) or `seller_win` (payment
//!    completes). Rulings are final.
//!
//! While a dispute is open or under review the order workflow is frozen.

pub mod dispute;
pub mod error;

pub use dispute::{
    AdminRuling, BuyerProof, Dispute, DisputeFiling, DisputeState, DisputeType, SellerResponse,
    TransitionRecord,
};
pub use error::ArbitrationError;

pub use agrimart_state::RulingDecision;
