//! # Event Dispatch
//!
//! Turns drained domain events into history entries and user notifications
//! and hands them to the configured sinks.
//!
//! ```text
//!   committed record ──► take_events() ──► EventDispatcher::dispatch
//!                                              │
//!                             ┌────────────────┴───────────────┐
//!                             ▼                                ▼
//!                      HistorySink::record           NotificationSink::notify
//! ```
//!
//! Dispatch runs after the store lock is released. A sink failure is logged
//! and counted in the [`DispatchReport`]; it never reaches the caller of the
//! operation that produced the event.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use agrimart_core::{Customer, DisputeId, OrderId, Role, Seller, UserId};
use agrimart_state::{DomainEvent, ItemStatus, RulingDecision};

use crate::audit::{HistoryEntry, HistorySink};
use crate::error::SinkError;

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderPlaced,
    OrderUpdate,
    ReceiptConfirmed,
    DisputeOpened,
    DisputeUpdate,
    DisputeEscalated,
    DisputeResolved,
}

/// The record a notification links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedType {
    Order,
    Dispute,
}

/// Delivery urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Urgent,
}

/// A message for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: UserId,
    pub role: Role,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub related_id: String,
    pub related_type: RelatedType,
    pub action_url: String,
    pub priority: Priority,
    pub send_email: bool,
}

impl Notification {
    fn about_order(
        user_id: UserId,
        role: Role,
        kind: NotificationKind,
        order_id: OrderId,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            role,
            kind,
            title: title.into(),
            message: message.into(),
            related_id: order_id.as_uuid().to_string(),
            related_type: RelatedType::Order,
            action_url: format!("/orders/{}", order_id.as_uuid()),
            priority: Priority::Normal,
            send_email: false,
        }
    }

    fn about_dispute(
        user_id: UserId,
        role: Role,
        kind: NotificationKind,
        dispute_id: DisputeId,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            role,
            kind,
            title: title.into(),
            message: message.into(),
            related_id: dispute_id.as_uuid().to_string(),
            related_type: RelatedType::Dispute,
            action_url: format!("/disputes/{}", dispute_id.as_uuid()),
            priority: Priority::High,
            send_email: true,
        }
    }

    fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    fn email(mut self, send_email: bool) -> Self {
        self.send_email = send_email;
        self
    }
}

fn to_customer(c: &Customer) -> (UserId, Role) {
    (c.id, c.role())
}

fn to_seller(s: &Seller) -> (UserId, Role) {
    (s.user_id(), s.role())
}

/// The notifications an event produces.
///
/// `admins` receive escalations; everything else goes to the order's parties.
pub fn notifications_for(event: &DomainEvent, admins: &[UserId]) -> Vec<Notification> {
    use NotificationKind as K;

    match event {
        DomainEvent::OrderPlaced {
            order_id, sellers, ..
        } => sellers
            .iter()
            .map(|s| {
                let (uid, role) = to_seller(s);
                Notification::about_order(
                    uid,
                    role,
                    K::OrderPlaced,
                    *order_id,
                    "New order",
                    "You have a new order waiting for acceptance.",
                )
                .email(true)
            })
            .collect(),
        DomainEvent::ItemTransitioned {
            order_id,
            customer,
            to,
            reason,
            ..
        } => {
            let (uid, role) = to_customer(customer);
            let message = match to {
                ItemStatus::Shipped => "An item in your order has been shipped.".to_string(),
                ItemStatus::Delivered => {
                    "An item in your order has been delivered. Please confirm receipt.".to_string()
                }
                ItemStatus::Rejected => match reason {
                    Some(r) => format!("An item in your order was rejected by the seller: {r}"),
                    None => "An item in your order was rejected by the seller.".to_string(),
                },
                _ => return Vec::new(),
            };
            let priority = if *to == ItemStatus::Rejected {
                Priority::High
            } else {
                Priority::Normal
            };
            vec![Notification::about_order(uid, role, K::OrderUpdate, *order_id, "Order update", message)
                .priority(priority)]
        }
        DomainEvent::ReceiptConfirmed {
            order_id,
            customer,
            sellers,
            automatic,
            ..
        } => {
            let message = if *automatic {
                "Receipt was confirmed automatically. Payment is complete."
            } else {
                "The buyer confirmed receipt. Payment is complete."
            };
            let mut out: Vec<Notification> = sellers
                .iter()
                .map(|s| {
                    let (uid, role) = to_seller(s);
                    Notification::about_order(uid, role, K::ReceiptConfirmed, *order_id, "Order received", message)
                })
                .collect();
            if *automatic {
                let (uid, role) = to_customer(customer);
                out.push(Notification::about_order(
                    uid,
                    role,
                    K::ReceiptConfirmed,
                    *order_id,
                    "Order marked as received",
                    "The confirmation window passed, so your order was marked as received.",
                ));
            }
            out
        }
        DomainEvent::DisputeOpened {
            dispute_id,
            seller,
            response_deadline,
            ..
        } => {
            let (uid, role) = to_seller(seller);
            vec![Notification::about_dispute(
                uid,
                role,
                K::DisputeOpened,
                *dispute_id,
                "Dispute opened",
                format!("A buyer opened a dispute. Respond before {response_deadline}."),
            )
            .priority(Priority::Urgent)]
        }
        DomainEvent::DisputeResponded {
            dispute_id, customer, ..
        } => {
            let (uid, role) = to_customer(customer);
            vec![Notification::about_dispute(
                uid,
                role,
                K::DisputeUpdate,
                *dispute_id,
                "Seller responded",
                "The seller responded to your dispute. Accept or reject the proposal.",
            )]
        }
        DomainEvent::DisputeResolvedByBuyer {
            dispute_id,
            customer,
            seller,
            accepted,
            ..
        } => {
            let (sid, srole) = to_seller(seller);
            if *accepted {
                vec![Notification::about_dispute(
                    sid,
                    srole,
                    K::DisputeResolved,
                    *dispute_id,
                    "Dispute closed",
                    "The buyer accepted your proposal. The dispute is closed.",
                )]
            } else {
                let (cid, crole) = to_customer(customer);
                let mut out = vec![Notification::about_dispute(
                    sid,
                    srole,
                    K::DisputeUpdate,
                    *dispute_id,
                    "Dispute under review",
                    "The buyer rejected your proposal. An admin will review the dispute.",
                )];
                out.push(
                    Notification::about_dispute(
                        cid,
                        crole,
                        K::DisputeUpdate,
                        *dispute_id,
                        "Dispute under review",
                        "Your dispute was sent to an admin for review.",
                    )
                    .priority(Priority::Normal),
                );
                out.extend(escalation_for_admins(*dispute_id, admins));
                out
            }
        }
        DomainEvent::DisputeEscalated {
            dispute_id, customer, ..
        } => {
            let (uid, role) = to_customer(customer);
            let mut out = vec![Notification::about_dispute(
                uid,
                role,
                K::DisputeEscalated,
                *dispute_id,
                "Dispute escalated",
                "The seller did not respond in time. An admin will review your dispute.",
            )];
            out.extend(escalation_for_admins(*dispute_id, admins));
            out
        }
        DomainEvent::DisputeRuled {
            dispute_id,
            customer,
            seller,
            decision,
            ..
        } => {
            let (buyer_msg, seller_msg) = match decision {
                RulingDecision::BuyerWin => (
                    "The admin ruled in your favour. Your payment will be refunded.",
                    "The admin ruled in the buyer's favour. The payment is refunded.",
                ),
                RulingDecision::SellerWin => (
                    "The admin ruled in the seller's favour. The payment is complete.",
                    "The admin ruled in your favour. The payment is complete.",
                ),
            };
            let (cid, crole) = to_customer(customer);
            let (sid, srole) = to_seller(seller);
            vec![
                Notification::about_dispute(cid, crole, K::DisputeResolved, *dispute_id, "Dispute resolved", buyer_msg),
                Notification::about_dispute(sid, srole, K::DisputeResolved, *dispute_id, "Dispute resolved", seller_msg),
            ]
        }
        DomainEvent::StockReleased { .. }
        | DomainEvent::OrderStatusChanged { .. }
        | DomainEvent::PaymentStatusChanged { .. } => Vec::new(),
    }
}

fn escalation_for_admins(dispute_id: DisputeId, admins: &[UserId]) -> impl Iterator<Item = Notification> + '_ {
    admins.iter().map(move |admin| {
        Notification::about_dispute(
            *admin,
            Role::Admin,
            NotificationKind::DisputeEscalated,
            dispute_id,
            "Dispute needs review",
            "A dispute is waiting for an admin ruling.",
        )
        .priority(Priority::Urgent)
    })
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Delivers notifications to users.
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification.
    fn notify(&self, notification: Notification) -> Result<(), SinkError>;
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, n: Notification) -> Result<(), SinkError> {
        tracing::info!(
            user = %n.user_id,
            role = %n.role,
            kind = ?n.kind,
            priority = ?n.priority,
            related = %n.related_id,
            email = n.send_email,
            "{}: {}",
            n.title,
            n.message
        );
        Ok(())
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    /// Notifications delivered to one user.
    pub fn sent_to(&self, user_id: UserId) -> Vec<Notification> {
        self.sent.lock().iter().filter(|n| n.user_id == user_id).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        self.sent.lock().push(notification);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// EventDispatcher
// ---------------------------------------------------------------------------

/// Counts of one dispatch call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub events: usize,
    pub history_recorded: usize,
    pub history_failed: usize,
    pub notified: usize,
    pub notify_failed: usize,
}

impl DispatchReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: DispatchReport) {
        self.events += other.events;
        self.history_recorded += other.history_recorded;
        self.history_failed += other.history_failed;
        self.notified += other.notified;
        self.notify_failed += other.notify_failed;
    }
}

/// Routes events to the history and notification sinks.
#[derive(Clone)]
pub struct EventDispatcher {
    history: Arc<dyn HistorySink>,
    notifier: Arc<dyn NotificationSink>,
    admins: Vec<UserId>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("admins", &self.admins)
            .finish_non_exhaustive()
    }
}

impl EventDispatcher {
    pub fn new(history: Arc<dyn HistorySink>, notifier: Arc<dyn NotificationSink>, admins: Vec<UserId>) -> Self {
        Self {
            history,
            notifier,
            admins,
        }
    }

    /// Admins notified of escalations.
    pub fn admins(&self) -> &[UserId] {
        &self.admins
    }

    /// Record and announce a batch of committed events.
    pub fn dispatch(&self, events: Vec<DomainEvent>) -> DispatchReport {
        let mut report = DispatchReport::default();
        for event in events {
            report.events += 1;

            if let Some(entry) = HistoryEntry::from_event(&event) {
                match self.history.record(entry) {
                    Ok(()) => report.history_recorded += 1,
                    Err(e) => {
                        report.history_failed += 1;
                        tracing::warn!(order = %event.order_id(), event = event.kind(), error = %e, "history record failed");
                    }
                }
            }

            for notification in notifications_for(&event, &self.admins) {
                let user = notification.user_id;
                match self.notifier.notify(notification) {
                    Ok(()) => report.notified += 1,
                    Err(e) => {
                        report.notify_failed += 1;
                        tracing::warn!(
                            order = %event.order_id(),
                            event = event.kind(),
                            %user,
                            error = %e,
                            "notification failed"
                        );
                    }
                }
            }
        }
        report
    }
}
