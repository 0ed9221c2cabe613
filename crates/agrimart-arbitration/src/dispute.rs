//! # Dispute Lifecycle
//!
//! A buyer-initiated complaint against an order, resolved by the seller's
//! proposal, the buyer's answer, or an admin ruling.
//!
//! ```text
//! (none) ──buyer opens──▶ OPEN ──buyer accepts──▶ CLOSED   (payment complete)
//!                          │ ▲
//!                          │ └─ seller responds (once)
//!                          │
//!            buyer rejects │ or no response by the deadline (sweep)
//!                          ▼
//!                 PENDING_ADMIN_REVIEW ──admin rules──▶ CLOSED
//!                                        buyer_win:  payment refunded
//!                                        seller_win: payment complete
//! ```
//!
//! ## Order mirror
//!
//! Every operation takes the disputed [`Order`] by `&mut` and mirrors the
//! dispute state onto `order.dispute_status` in the same call. Callers hold
//! both under one lock, so the two can never be observed out of step.
//! Events are appended to the order's outbox.
//!
//! ## Design Choice: Validated Enum over Typestate
//!
//! Disputes are stored and reloaded with a state known only at runtime, and
//! there are three states. A validated enum with `require_state` is enough.

use serde::{Deserialize, Serialize};

use agrimart_core::{
    Actor, Customer, DisputeId, MarketConfig, OrderId, Seller, Timestamp, UserId, ValidationError,
};
use agrimart_state::{DisputeStatus, DomainEvent, Order, OrderStatus, PaymentStatus, RulingDecision};

use crate::error::ArbitrationError;

// ── Dispute State ──────────────────────────────────────────────────────

/// Lifecycle state of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeState {
    /// Awaiting the seller's response or the buyer's answer.
    Open,
    /// Escalated; only an admin ruling moves it on.
    PendingAdminReview,
    /// Resolved. Terminal state.
    Closed,
}

impl DisputeState {
    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::PendingAdminReview => "pending_admin_review",
            Self::Closed => "closed",
        }
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Valid target states from this state.
    pub fn valid_transitions(&self) -> &'static [DisputeState] {
        match self {
            Self::Open => &[Self::PendingAdminReview, Self::Closed],
            Self::PendingAdminReview => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    /// The order-level mirror of this state.
    pub fn order_mirror(&self) -> DisputeStatus {
        match self {
            Self::Open => DisputeStatus::Open,
            Self::PendingAdminReview => DisputeStatus::PendingAdminReview,
            Self::Closed => DisputeStatus::Closed,
        }
    }
}

impl std::fmt::Display for DisputeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Dispute Types ──────────────────────────────────────────────────────

/// What the buyer is complaining about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    /// The goods never arrived.
    NonDelivery,
    /// The goods arrived damaged or defective.
    ProductFault,
    /// Different goods arrived.
    WrongItem,
    /// Anything else.
    Other,
}

impl DisputeType {
    /// All dispute types.
    pub fn all() -> &'static [DisputeType] {
        &[Self::NonDelivery, Self::ProductFault, Self::WrongItem, Self::Other]
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonDelivery => "non_delivery",
            Self::ProductFault => "product_fault",
            Self::WrongItem => "wrong_item",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for DisputeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DisputeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s.to_ascii_lowercase())
            .ok_or_else(|| format!("unknown dispute type: {s}"))
    }
}

// ── Evidence ───────────────────────────────────────────────────────────

/// The buyer's supporting material, supplied when opening.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerProof {
    /// Image URLs.
    pub images: Vec<String>,
    pub description: String,
}

/// The seller's one-time response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerResponse {
    /// Evidence references (image or document URLs). Never empty.
    pub evidence: Vec<String>,
    /// What the seller offers to resolve the complaint.
    pub proposal: String,
    pub responded_at: Timestamp,
}

/// The admin's final decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRuling {
    pub decision: RulingDecision,
    pub notes: String,
    pub admin_id: UserId,
    pub ruled_at: Timestamp,
}

/// Everything the buyer supplies to open a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeFiling {
    pub dispute_type: DisputeType,
    pub reason: String,
    pub proof: BuyerProof,
    /// Required when the order has more than one seller.
    pub seller: Option<Seller>,
}

/// A record of a dispute state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from_state: Option<DisputeState>,
    pub to_state: DisputeState,
    pub timestamp: Timestamp,
    /// `None` for sweep-driven transitions.
    pub actor: Option<Actor>,
}

// ── Dispute ────────────────────────────────────────────────────────────

/// A dispute against one seller's part of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub order_id: OrderId,
    pub customer: Customer,
    pub seller: Seller,
    pub dispute_type: DisputeType,
    pub reason: String,
    pub buyer_proof: BuyerProof,
    pub seller_response: Option<SellerResponse>,
    pub admin_ruling: Option<AdminRuling>,
    pub state: DisputeState,
    /// Set when the buyer accepts the seller's proposal.
    pub buyer_accepted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub response_deadline: Timestamp,
    pub resolved_at: Option<Timestamp>,
    pub transition_log: Vec<TransitionRecord>,
}

impl Dispute {
    /// Open a dispute on `order`.
    ///
    /// The caller must be the order's customer. The order must have shipped,
    /// must not already carry an active dispute, and must still be inside
    /// the dispute window when it has been received (or, for non-delivery
    /// claims, delivered). Opening forces the payment back to `pending`.
    pub fn open(
        order: &mut Order,
        actor: &Actor,
        filing: DisputeFiling,
        now: Timestamp,
        config: &MarketConfig,
    ) -> Result<Self, ArbitrationError> {
        if !order.customer.is(actor) {
            return Err(ArbitrationError::Forbidden {
                actor: actor.to_string(),
                action: "open a dispute on this order",
            });
        }
        if order.dispute_status.blocks_workflow() {
            return Err(ArbitrationError::AlreadyActive { order_id: order.id });
        }
        let reason = filing.reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::EmptyField { field: "reason" }.into());
        }

        let status = order.live_status();
        if !status.is_shipped_or_later() {
            return Err(ArbitrationError::OrderNotEligible {
                order_id: order.id,
                status: order.order_status,
            });
        }
        let window = config.delivered_to_received_minutes;
        let window_start = match status {
            OrderStatus::Received => order.received_at,
            OrderStatus::Delivered if filing.dispute_type == DisputeType::NonDelivery => {
                order.last_delivered_at()
            }
            _ => None,
        };
        if let Some(start) = window_start {
            if now.seconds_since(&start) > i64::from(window) * 60 {
                return Err(ArbitrationError::WindowClosed {
                    order_id: order.id,
                    window_minutes: window,
                });
            }
        }

        let seller = match filing.seller {
            Some(s) if order.has_seller(&s) => s,
            Some(_) => return Err(ArbitrationError::SellerNotInOrder { order_id: order.id }),
            None => order
                .sole_seller()
                .ok_or(ArbitrationError::SellerRequired { order_id: order.id })?,
        };

        let response_deadline = now.plus_minutes(i64::from(config.dispute_response_minutes));
        let dispute = Self {
            id: DisputeId::new(),
            order_id: order.id,
            customer: order.customer,
            seller,
            dispute_type: filing.dispute_type,
            reason: reason.to_string(),
            buyer_proof: filing.proof,
            seller_response: None,
            admin_ruling: None,
            state: DisputeState::Open,
            buyer_accepted: false,
            created_at: now,
            updated_at: now,
            response_deadline,
            resolved_at: None,
            transition_log: vec![TransitionRecord {
                from_state: None,
                to_state: DisputeState::Open,
                timestamp: now,
                actor: Some(*actor),
            }],
        };

        order.set_dispute_status(DisputeStatus::Open, now);
        order.set_payment_status(PaymentStatus::Pending, Some(*actor), now);
        order.push_event(DomainEvent::DisputeOpened {
            order_id: order.id,
            dispute_id: dispute.id,
            customer: dispute.customer,
            seller,
            response_deadline,
            at: now,
        });
        tracing::info!(dispute_id = %dispute.id, order_id = %order.id, kind = %dispute.dispute_type, "dispute opened");
        Ok(dispute)
    }

    /// Record the seller's one-time response. The dispute stays open.
    pub fn respond(
        &mut self,
        order: &mut Order,
        actor: &Actor,
        evidence: Vec<String>,
        proposal: &str,
        now: Timestamp,
    ) -> Result<(), ArbitrationError> {
        self.require_order(order)?;
        if !self.seller.is(actor) {
            return Err(ArbitrationError::Forbidden {
                actor: actor.to_string(),
                action: "respond to this dispute",
            });
        }
        self.require_state(DisputeState::Open, DisputeState::Open)?;
        if self.seller_response.is_some() {
            return Err(ArbitrationError::AlreadyResponded {
                dispute_id: self.id.to_string(),
            });
        }
        let evidence: Vec<String> = evidence
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if evidence.is_empty() {
            return Err(ValidationError::EmptyField { field: "evidence" }.into());
        }
        let proposal = proposal.trim();
        if proposal.is_empty() {
            return Err(ValidationError::EmptyField { field: "proposal" }.into());
        }

        self.seller_response = Some(SellerResponse {
            evidence,
            proposal: proposal.to_string(),
            responded_at: now,
        });
        self.updated_at = now;
        order.push_event(DomainEvent::DisputeResponded {
            order_id: order.id,
            dispute_id: self.id,
            customer: self.customer,
            seller: self.seller,
            at: now,
        });
        Ok(())
    }

    /// The buyer accepts or rejects the seller's proposal.
    ///
    /// Accepting closes the dispute and completes payment. Rejecting sends
    /// it to admin review.
    pub fn resolve(
        &mut self,
        order: &mut Order,
        actor: &Actor,
        accept: bool,
        now: Timestamp,
    ) -> Result<(), ArbitrationError> {
        self.require_order(order)?;
        if !self.customer.is(actor) {
            return Err(ArbitrationError::Forbidden {
                actor: actor.to_string(),
                action: "resolve this dispute",
            });
        }
        let target = if accept {
            DisputeState::Closed
        } else {
            DisputeState::PendingAdminReview
        };
        self.require_state(DisputeState::Open, target)?;
        if self.seller_response.is_none() {
            return Err(ArbitrationError::AwaitingSellerResponse {
                dispute_id: self.id.to_string(),
            });
        }

        let who = Some(*actor);
        self.record_transition(target, who, now);
        order.set_dispute_status(target.order_mirror(), now);
        if accept {
            self.buyer_accepted = true;
            self.resolved_at = Some(now);
            order.set_payment_status(PaymentStatus::Complete, who, now);
        }
        order.push_event(DomainEvent::DisputeResolvedByBuyer {
            order_id: order.id,
            dispute_id: self.id,
            customer: self.customer,
            seller: self.seller,
            accepted: accept,
            at: now,
        });
        Ok(())
    }

    /// Open, unanswered, and past its response deadline.
    pub fn is_overdue(&self, now: Timestamp, config: &MarketConfig) -> bool {
        let limit = i64::from(config.dispute_response_minutes) * 60;
        self.state == DisputeState::Open
            && self.seller_response.is_none()
            && now.seconds_since(&self.created_at) >= limit
    }

    /// Escalate an overdue dispute to admin review.
    pub fn escalate(
        &mut self,
        order: &mut Order,
        now: Timestamp,
        config: &MarketConfig,
    ) -> Result<(), ArbitrationError> {
        self.require_order(order)?;
        self.require_state(DisputeState::Open, DisputeState::PendingAdminReview)?;
        if !self.is_overdue(now, config) {
            return Err(ArbitrationError::NotOverdue {
                dispute_id: self.id.to_string(),
            });
        }
        self.record_transition(DisputeState::PendingAdminReview, None, now);
        order.set_dispute_status(DisputeStatus::PendingAdminReview, now);
        order.push_event(DomainEvent::DisputeEscalated {
            order_id: order.id,
            dispute_id: self.id,
            customer: self.customer,
            seller: self.seller,
            at: now,
        });
        tracing::info!(dispute_id = %self.id, order_id = %order.id, "dispute escalated to admin review");
        Ok(())
    }

    /// Final, irreversible admin ruling on an escalated dispute.
    pub fn rule(
        &mut self,
        order: &mut Order,
        actor: &Actor,
        decision: RulingDecision,
        notes: &str,
        now: Timestamp,
    ) -> Result<(), ArbitrationError> {
        self.require_order(order)?;
        if !actor.is_admin() {
            return Err(ArbitrationError::Forbidden {
                actor: actor.to_string(),
                action: "rule on disputes",
            });
        }
        self.require_state(DisputeState::PendingAdminReview, DisputeState::Closed)?;

        self.admin_ruling = Some(AdminRuling {
            decision,
            notes: notes.trim().to_string(),
            admin_id: actor.user_id,
            ruled_at: now,
        });
        self.resolved_at = Some(now);
        self.record_transition(DisputeState::Closed, Some(*actor), now);
        order.set_dispute_status(DisputeStatus::Closed, now);
        order.set_payment_status(decision.payment_outcome(), Some(*actor), now);
        order.push_event(DomainEvent::DisputeRuled {
            order_id: order.id,
            dispute_id: self.id,
            customer: self.customer,
            seller: self.seller,
            decision,
            admin: *actor,
            at: now,
        });
        tracing::info!(dispute_id = %self.id, %decision, "dispute ruled");
        Ok(())
    }

    /// Open or awaiting admin review.
    pub fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Whether `user` is the buyer or the seller in this dispute.
    pub fn involves(&self, user: UserId) -> bool {
        self.customer.id == user || self.seller.user_id() == user
    }

    fn require_order(&self, order: &Order) -> Result<(), ArbitrationError> {
        if order.id != self.order_id {
            return Err(ArbitrationError::OrderMismatch {
                dispute_id: self.id.to_string(),
                expected: self.order_id,
                actual: order.id,
            });
        }
        Ok(())
    }

    /// Check that the dispute is in the expected state for a transition.
    fn require_state(
        &self,
        expected: DisputeState,
        target: DisputeState,
    ) -> Result<(), ArbitrationError> {
        if self.state.is_terminal() {
            return Err(ArbitrationError::TerminalState {
                dispute_id: self.id.to_string(),
                state: self.state.as_str().to_string(),
            });
        }
        if self.state != expected {
            return Err(ArbitrationError::InvalidTransition {
                from: self.state.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: format!("expected state {}, got {}", expected, self.state),
            });
        }
        Ok(())
    }

    fn record_transition(&mut self, to: DisputeState, actor: Option<Actor>, now: Timestamp) {
        self.transition_log.push(TransitionRecord {
            from_state: Some(self.state),
            to_state: to,
            timestamp: now,
            actor,
        });
        self.state = to;
        self.updated_at = now;
    }
}
