//! # Status Vocabularies
//!
//! The line-item status machine, the derived order status, and the two
//! independent order axes (payment and dispute).
//!
//! ## Line items
//!
//! ```text
//! pending ──▶ confirmed ──▶ processing ──▶ shipped ──▶ delivered ──▶ received
//!    │            │              │                     (receipt only)
//!    ├──▶ rejected│              │
//!    └──────▶ cancelled ◀────────┘
//! ```
//!
//! `delivered`, `received`, `rejected` and `cancelled` accept no workflow
//! transition. `delivered → received` happens only through receipt
//! confirmation, never through [`ItemStatus::allowed_next`].
//!
//! ## Order status derivation
//!
//! [`derive_order_status`] is the only way an order status is produced. At
//! order level `rejected` reads as `cancelled`.

use serde::{Deserialize, Serialize};

// ─── Line Item Status ────────────────────────────────────────────────

/// Status of one line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Awaiting the seller's decision.
    Pending,
    /// Accepted by the seller.
    Confirmed,
    /// Being prepared for shipment.
    Processing,
    /// Handed to delivery.
    Shipped,
    /// Delivered, awaiting the customer's receipt confirmation.
    Delivered,
    /// Receipt confirmed by the customer or automatically.
    Received,
    /// Declined by the seller.
    Rejected,
    /// Withdrawn before shipment.
    Cancelled,
}

impl ItemStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [ItemStatus; 8] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Received,
        Self::Rejected,
        Self::Cancelled,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Received => "received",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable through a workflow transition.
    pub fn allowed_next(&self) -> &'static [ItemStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Rejected, Self::Cancelled],
            Self::Confirmed => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered | Self::Received | Self::Rejected | Self::Cancelled => &[],
        }
    }

    /// Whether `next` is a legal workflow transition from this status.
    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// No workflow transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::Received | Self::Rejected | Self::Cancelled
        )
    }

    /// Rejected or cancelled.
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }

    /// The customer may still cancel an item in this status.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Processing)
    }

    /// The status as seen by the whole-order view.
    fn order_view(&self) -> OrderStatus {
        match self {
            Self::Pending => OrderStatus::Pending,
            Self::Confirmed => OrderStatus::Confirmed,
            Self::Processing => OrderStatus::Processing,
            Self::Shipped => OrderStatus::Shipped,
            Self::Delivered => OrderStatus::Delivered,
            Self::Received => OrderStatus::Received,
            Self::Rejected | Self::Cancelled => OrderStatus::Cancelled,
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown item status: {s}"))
    }
}

/// Render a status set as `a, b, c` (or `none`).
pub fn format_statuses(statuses: &[ItemStatus]) -> String {
    if statuses.is_empty() {
        return "none".to_string();
    }
    statuses
        .iter()
        .map(ItemStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ─── Order Status ────────────────────────────────────────────────────

/// Whole-order status, derived from the line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Received,
    Cancelled,
    PartiallyCancelled,
    PartiallyDelivered,
    PartiallyShipped,
}

impl OrderStatus {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Received => "received",
            Self::Cancelled => "cancelled",
            Self::PartiallyCancelled => "partially_cancelled",
            Self::PartiallyDelivered => "partially_delivered",
            Self::PartiallyShipped => "partially_shipped",
        }
    }

    /// Shipped or later; a dispute may be raised against such an order.
    pub fn is_shipped_or_later(&self) -> bool {
        matches!(
            self,
            Self::Shipped
                | Self::Delivered
                | Self::Received
                | Self::PartiallyShipped
                | Self::PartiallyDelivered
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the whole-order status from line-item statuses.
///
/// - no items, or all items share one status: that status;
/// - otherwise any cancelled (or rejected): `partially_cancelled`;
/// - otherwise any delivered: `partially_delivered`;
/// - otherwise any shipped: `partially_shipped`;
/// - otherwise `processing`.
pub fn derive_order_status<I>(statuses: I) -> OrderStatus
where
    I: IntoIterator<Item = ItemStatus>,
{
    let views: Vec<OrderStatus> = statuses.into_iter().map(|s| s.order_view()).collect();
    let Some(first) = views.first().copied() else {
        return OrderStatus::Pending;
    };
    if views.iter().all(|v| *v == first) {
        return first;
    }
    if views.contains(&OrderStatus::Cancelled) {
        OrderStatus::PartiallyCancelled
    } else if views.contains(&OrderStatus::Delivered) {
        OrderStatus::PartiallyDelivered
    } else if views.contains(&OrderStatus::Shipped) {
        OrderStatus::PartiallyShipped
    } else {
        OrderStatus::Processing
    }
}

// ─── Payment ─────────────────────────────────────────────────────────

/// Payment bookkeeping status. No gateway is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Complete,
    Refunded,
    Cancelled,
}

impl PaymentStatus {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Refunded => "refunded",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Collected on delivery. A fully voided order owes nothing.
    CashOnDelivery,
    /// Paid up front. A fully voided order is refunded.
    Prepaid,
}

impl PaymentMethod {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "cash_on_delivery",
            Self::Prepaid => "prepaid",
        }
    }

    /// Payment status applied when every item is rejected or cancelled.
    pub fn void_outcome(&self) -> PaymentStatus {
        match self {
            Self::CashOnDelivery => PaymentStatus::Cancelled,
            Self::Prepaid => PaymentStatus::Refunded,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Dispute mirror ──────────────────────────────────────────────────

/// The order's view of its dispute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    #[default]
    None,
    Open,
    PendingAdminReview,
    Closed,
}

impl DisputeStatus {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Open => "open",
            Self::PendingAdminReview => "pending_admin_review",
            Self::Closed => "closed",
        }
    }

    /// An active dispute freezes the order workflow.
    pub fn blocks_workflow(&self) -> bool {
        matches!(self, Self::Open | Self::PendingAdminReview)
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary admin ruling on an escalated dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulingDecision {
    /// The buyer prevails; payment is refunded.
    BuyerWin,
    /// The seller prevails; payment is completed.
    SellerWin,
}

impl RulingDecision {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyerWin => "buyer_win",
            Self::SellerWin => "seller_win",
        }
    }

    /// Payment status the ruling settles on.
    pub fn payment_outcome(&self) -> PaymentStatus {
        match self {
            Self::BuyerWin => PaymentStatus::Refunded,
            Self::SellerWin => PaymentStatus::Complete,
        }
    }
}

impl std::fmt::Display for RulingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RulingDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buyer_win" => Ok(Self::BuyerWin),
            "seller_win" => Ok(Self::SellerWin),
            _ => Err(format!("unknown ruling decision: {s} (expected buyer_win or seller_win)")),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ItemStatus::*;

    #[test]
    fn terminal_statuses_allow_nothing() {
        for s in ItemStatus::ALL {
            assert_eq!(s.is_terminal(), s.allowed_next().is_empty(), "{s}");
        }
    }

    #[test]
    fn delivered_to_received_is_not_a_workflow_transition() {
        assert!(!Delivered.can_transition_to(Received));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Processing));
    }

    #[test]
    fn derive_uniform_statuses() {
        assert_eq!(derive_order_status([]), OrderStatus::Pending);
        assert_eq!(derive_order_status([Shipped, Shipped]), OrderStatus::Shipped);
        assert_eq!(derive_order_status([Received]), OrderStatus::Received);
    }

    #[test]
    fn rejected_reads_as_cancelled() {
        assert_eq!(derive_order_status([Rejected]), OrderStatus::Cancelled);
        assert_eq!(derive_order_status([Rejected, Cancelled]), OrderStatus::Cancelled);
    }

    #[test]
    fn derive_mixed_statuses_by_priority() {
        assert_eq!(
            derive_order_status([Rejected, Processing]),
            OrderStatus::PartiallyCancelled
        );
        assert_eq!(
            derive_order_status([Cancelled, Delivered, Shipped]),
            OrderStatus::PartiallyCancelled
        );
        assert_eq!(
            derive_order_status([Delivered, Shipped]),
            OrderStatus::PartiallyDelivered
        );
        assert_eq!(
            derive_order_status([Shipped, Processing]),
            OrderStatus::PartiallyShipped
        );
        assert_eq!(
            derive_order_status([Pending, Confirmed]),
            OrderStatus::Processing
        );
    }

    #[test]
    fn void_outcome_depends_on_method() {
        assert_eq!(PaymentMethod::CashOnDelivery.void_outcome(), PaymentStatus::Cancelled);
        assert_eq!(PaymentMethod::Prepaid.void_outcome(), PaymentStatus::Refunded);
    }

    #[test]
    fn ruling_payment_outcomes() {
        assert_eq!(RulingDecision::BuyerWin.payment_outcome(), PaymentStatus::Refunded);
        assert_eq!(RulingDecision::SellerWin.payment_outcome(), PaymentStatus::Complete);
        assert_eq!("seller_win".parse::<RulingDecision>().unwrap(), RulingDecision::SellerWin);
        assert!("draw".parse::<RulingDecision>().is_err());
    }

    #[test]
    fn dispute_mirror_blocking() {
        assert!(DisputeStatus::Open.blocks_workflow());
        assert!(DisputeStatus::PendingAdminReview.blocks_workflow());
        assert!(!DisputeStatus::None.blocks_workflow());
        assert!(!DisputeStatus::Closed.blocks_workflow());
    }

    #[test]
    fn wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PartiallyDelivered).unwrap(),
            "\"partially_delivered\""
        );
        assert_eq!(
            serde_json::to_string(&DisputeStatus::PendingAdminReview).unwrap(),
            "\"pending_admin_review\""
        );
        assert_eq!("SHIPPED".parse::<ItemStatus>().unwrap(), Shipped);
    }

    fn any_status() -> impl Strategy<Value = ItemStatus> {
        prop::sample::select(ItemStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn derivation_ignores_item_order(mut items in prop::collection::vec(any_status(), 0..8)) {
            let forward = derive_order_status(items.clone());
            items.reverse();
            prop_assert_eq!(forward, derive_order_status(items));
        }

        #[test]
        fn partial_statuses_only_for_mixed_orders(items in prop::collection::vec(any_status(), 1..8)) {
            let derived = derive_order_status(items.clone());
            let partial = matches!(
                derived,
                OrderStatus::PartiallyCancelled
                    | OrderStatus::PartiallyDelivered
                    | OrderStatus::PartiallyShipped
            );
            if partial {
                let first = items[0].order_view();
                prop_assert!(items.iter().any(|s| s.order_view() != first));
            }
        }
    }
}
