//! End-to-end order and dispute lifecycles through the service layer.
//!
//! Every test runs on a manual clock, so timing gates and sweep windows are
//! exercised without sleeping.

use std::sync::Arc;

use agrimart_agentic::{EventDispatcher, HistoryChange, HistoryTrail, NotificationKind, RecordingNotifier, TaskKind};
use agrimart_arbitration::{BuyerProof, DisputeFiling, DisputeState, DisputeType, RulingDecision};
use agrimart_core::{Actor, Clock, ManualClock, OrderId, ProductId, Role, Seller, SharedConfig, Timestamp, UserId};
use agrimart_market::{
    ErrorKind, InMemoryCatalog, MarketService, MarketState, OrderLine, Product, SweepWorker,
};
use agrimart_state::{DisputeStatus, ItemStatus, OrderStatus, PaymentMethod, PaymentStatus};
use chrono::{TimeZone, Utc};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Market {
    service: MarketService,
    catalog: Arc<InMemoryCatalog>,
    clock: Arc<ManualClock>,
    trail: Arc<HistoryTrail>,
    notifier: Arc<RecordingNotifier>,
    admin: Actor,
}

fn market() -> Market {
    let clock = Arc::new(ManualClock::new(Timestamp::from_utc(
        Utc.with_ymd_and_hms(2026, 9, 14, 7, 30, 0).unwrap(),
    )));
    let catalog = Arc::new(InMemoryCatalog::new());
    let trail = Arc::new(HistoryTrail::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let admin = Actor::admin(UserId::new());
    let dispatcher = EventDispatcher::new(trail.clone(), notifier.clone(), vec![admin.user_id]);
    let service = MarketService::new(
        MarketState::new(),
        SharedConfig::default(),
        catalog.clone(),
        dispatcher,
        clock.clone(),
    );
    Market {
        service,
        catalog,
        clock,
        trail,
        notifier,
        admin,
    }
}

impl Market {
    fn list(&self, seller: &Actor, name: &str, available: u32) -> ProductId {
        let product = Product {
            id: ProductId::new(),
            name: name.to_string(),
            seller: seller.as_seller().unwrap(),
            unit_price: 2_500,
            available,
            delivery_days: None,
        };
        let id = product.id;
        self.catalog.add(product);
        id
    }

    fn order_one(&self, buyer: &Actor, product_id: ProductId, method: PaymentMethod) -> OrderId {
        self.service
            .place_order(buyer, &[OrderLine { product_id, quantity: 1 }], method)
            .unwrap()
            .id
    }

    /// Accept, ship, wait out the dwell time and deliver.
    fn deliver(&self, seller: &Actor, order_id: OrderId, product_id: ProductId) {
        self.service.accept_order(seller, order_id).unwrap();
        self.service
            .transition_item(seller, order_id, product_id, ItemStatus::Shipped, None)
            .unwrap();
        self.clock.advance_minutes(10);
        self.service
            .transition_item(seller, order_id, product_id, ItemStatus::Delivered, None)
            .unwrap();
    }

    fn filing(kind: DisputeType) -> DisputeFiling {
        DisputeFiling {
            dispute_type: kind,
            reason: "half the sacks were mouldy".into(),
            proof: BuyerProof {
                images: vec!["https://img.example/sack-1.jpg".into()],
                description: "photos at unloading".into(),
            },
            seller: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Happy path with the delivery timing gate
// ---------------------------------------------------------------------------

#[test]
fn happy_path_with_timing_gate() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "cassava", 5);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::CashOnDelivery);

    let order = m.service.accept_order(&farmer, order_id).unwrap();
    assert_eq!(order.items[0].status, ItemStatus::Processing);
    assert_eq!(order.order_status, OrderStatus::Processing);

    let shipped_at = m.clock.now();
    let order = m
        .service
        .transition_item(&farmer, order_id, pid, ItemStatus::Shipped, None)
        .unwrap();
    assert_eq!(order.order_status, OrderStatus::Shipped);
    assert_eq!(order.items[0].shipped_at, Some(shipped_at));
    assert_eq!(order.expected_delivery_date, Some(shipped_at.plus_days(7)));

    let err = m
        .service
        .transition_item(&farmer, order_id, pid, ItemStatus::Delivered, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("wait 10 more minutes"), "{err}");

    m.clock.advance_minutes(9);
    let err = m
        .service
        .transition_item(&farmer, order_id, pid, ItemStatus::Delivered, None)
        .unwrap_err();
    assert!(err.to_string().contains("wait 1 more minute"), "{err}");

    m.clock.advance_minutes(1);
    let order = m
        .service
        .transition_item(&farmer, order_id, pid, ItemStatus::Delivered, None)
        .unwrap();
    assert_eq!(order.order_status, OrderStatus::Delivered);

    let order = m.service.confirm_receipt(&buyer, order_id).unwrap();
    assert_eq!(order.order_status, OrderStatus::Received);
    assert_eq!(order.items[0].status, ItemStatus::Received);
    assert_eq!(order.payment_status, PaymentStatus::Complete);
    assert!(order.received_at.is_some());
    assert!(order.paid_at.is_some());

    let history = m.trail.for_order(order_id);
    assert!(history.iter().any(|h| h.change_type == HistoryChange::ReceiptConfirmed));
    assert!(m.trail.verify_chain().chain_valid);
}

#[test]
fn delivered_items_never_move_again() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "yam", 5);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::Prepaid);
    m.deliver(&farmer, order_id, pid);

    for target in [ItemStatus::Shipped, ItemStatus::Cancelled, ItemStatus::Processing] {
        let err = m
            .service
            .transition_item(&farmer, order_id, pid, target, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}

// ---------------------------------------------------------------------------
// Automatic receipt confirmation
// ---------------------------------------------------------------------------

#[test]
fn unconfirmed_delivery_is_confirmed_by_the_sweep() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let supplier = Actor::supplier(UserId::new());
    let pid = m.list(&supplier, "urea 50kg", 10);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::CashOnDelivery);
    m.deliver(&supplier, order_id, pid);

    m.clock.advance_minutes(9);
    let report = m.service.run_confirmation_sweep();
    assert_eq!(report.applied, 0);

    m.clock.advance_minutes(1);
    let report = m.service.run_confirmation_sweep();
    assert_eq!((report.examined, report.applied), (1, 1));

    let order = m.service.order(&buyer, order_id).unwrap();
    assert_eq!(order.order_status, OrderStatus::Received);
    assert_eq!(order.payment_status, PaymentStatus::Complete);
    assert_eq!(m.service.metrics().auto_confirmed(), 1);

    // idempotent
    let report = m.service.run_confirmation_sweep();
    assert_eq!(report.examined, 0);

    let seller_notes = m.notifier.sent_to(supplier.user_id);
    assert!(seller_notes.iter().any(|n| n.kind == NotificationKind::ReceiptConfirmed));
    let buyer_notes = m.notifier.sent_to(buyer.user_id);
    assert!(buyer_notes
        .iter()
        .any(|n| n.kind == NotificationKind::ReceiptConfirmed && n.message.contains("window passed")));
}

#[test]
fn open_dispute_blocks_auto_confirmation() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "groundnuts", 10);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::Prepaid);
    m.deliver(&farmer, order_id, pid);
    m.service
        .open_dispute(&buyer, order_id, Market::filing(DisputeType::ProductFault))
        .unwrap();

    m.clock.advance_minutes(30);
    let report = m.service.run_confirmation_sweep();
    assert_eq!(report.applied, 0);
    let order = m.service.order(&buyer, order_id).unwrap();
    assert_eq!(order.order_status, OrderStatus::Delivered);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
}

// ---------------------------------------------------------------------------
// Escalation and admin ruling
// ---------------------------------------------------------------------------

#[test]
fn unanswered_dispute_is_escalated_then_ruled() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "tomatoes, crate", 10);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::CashOnDelivery);
    m.deliver(&farmer, order_id, pid);

    let dispute = m
        .service
        .open_dispute(&buyer, order_id, Market::filing(DisputeType::ProductFault))
        .unwrap();
    assert_eq!(dispute.state, DisputeState::Open);
    assert_eq!(
        m.service.order(&buyer, order_id).unwrap().dispute_status,
        DisputeStatus::Open
    );

    let err = m
        .service
        .open_dispute(&buyer, order_id, Market::filing(DisputeType::WrongItem))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = m
        .service
        .rule_dispute(&m.admin, dispute.id, RulingDecision::SellerWin, "early")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    m.clock.advance_minutes(9);
    assert_eq!(m.service.run_escalation_sweep().applied, 0);
    m.clock.advance_minutes(1);
    let report = m.service.run_escalation_sweep();
    assert_eq!((report.examined, report.applied, report.failed), (1, 1, 0));

    let escalated = m.service.dispute(&buyer, dispute.id).unwrap();
    assert_eq!(escalated.state, DisputeState::PendingAdminReview);
    let order = m.service.order(&buyer, order_id).unwrap();
    assert_eq!(order.dispute_status, DisputeStatus::PendingAdminReview);

    let admin_notes = m.notifier.sent_to(m.admin.user_id);
    assert!(admin_notes
        .iter()
        .any(|n| n.kind == NotificationKind::DisputeEscalated && n.role == Role::Admin));

    let err = m
        .service
        .rule_dispute(&buyer, dispute.id, RulingDecision::BuyerWin, "me")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let ruled = m
        .service
        .rule_dispute(&m.admin, dispute.id, RulingDecision::SellerWin, "photos show dry sacks")
        .unwrap();
    assert_eq!(ruled.state, DisputeState::Closed);
    let order = m.service.order(&buyer, order_id).unwrap();
    assert_eq!(order.dispute_status, DisputeStatus::Closed);
    assert_eq!(order.payment_status, PaymentStatus::Complete);

    let err = m
        .service
        .rule_dispute(&m.admin, dispute.id, RulingDecision::BuyerWin, "again")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn buyer_win_refund_survives_later_receipt() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let swept = m.list(&farmer, "millet, 50kg", 10);
    let manual = m.list(&farmer, "cassava flour", 10);
    let swept_order = m.order_one(&buyer, swept, PaymentMethod::Prepaid);
    let manual_order = m.order_one(&buyer, manual, PaymentMethod::Prepaid);
    m.deliver(&farmer, swept_order, swept);
    m.deliver(&farmer, manual_order, manual);

    for order_id in [swept_order, manual_order] {
        let dispute = m
            .service
            .open_dispute(&buyer, order_id, Market::filing(DisputeType::ProductFault))
            .unwrap();
        m.clock.advance_minutes(10);
        assert_eq!(m.service.run_escalation_sweep().applied, 1);
        m.service
            .rule_dispute(&m.admin, dispute.id, RulingDecision::BuyerWin, "mould confirmed")
            .unwrap();
        let order = m.service.order(&buyer, order_id).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Refunded);
    }

    let order = m.service.confirm_receipt(&buyer, manual_order).unwrap();
    assert_eq!(order.order_status, OrderStatus::Received);
    assert_eq!(order.payment_status, PaymentStatus::Refunded);

    m.clock.advance_minutes(30);
    let report = m.service.run_confirmation_sweep();
    assert_eq!((report.applied, report.failed), (1, 0));
    let order = m.service.order(&buyer, swept_order).unwrap();
    assert_eq!(order.order_status, OrderStatus::Received);
    assert_eq!(order.payment_status, PaymentStatus::Refunded);
    assert_eq!(order.paid_at, None);
}

#[test]
fn answered_dispute_is_never_escalated() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "onions", 10);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::Prepaid);
    m.deliver(&farmer, order_id, pid);
    let dispute = m
        .service
        .open_dispute(&buyer, order_id, Market::filing(DisputeType::ProductFault))
        .unwrap();

    m.service
        .respond_dispute(&farmer, dispute.id, vec!["loading photo".into()], "refund half")
        .unwrap();
    m.clock.advance_minutes(24 * 60);
    assert_eq!(m.service.run_escalation_sweep().examined, 0);

    let rejected = m.service.resolve_dispute(&buyer, dispute.id, false).unwrap();
    assert_eq!(rejected.state, DisputeState::PendingAdminReview);

    let ruled = m
        .service
        .rule_dispute(&m.admin, dispute.id, RulingDecision::BuyerWin, "")
        .unwrap();
    assert_eq!(ruled.state, DisputeState::Closed);
    let order = m.service.order(&buyer, order_id).unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Refunded);
}

#[test]
fn accepted_proposal_closes_dispute() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "beans", 10);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::Prepaid);
    m.deliver(&farmer, order_id, pid);
    let dispute = m
        .service
        .open_dispute(&buyer, order_id, Market::filing(DisputeType::WrongItem))
        .unwrap();

    let err = m.service.resolve_dispute(&buyer, dispute.id, true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    m.service
        .respond_dispute(&farmer, dispute.id, vec!["dispatch note".into()], "send the right beans tomorrow")
        .unwrap();
    let closed = m.service.resolve_dispute(&buyer, dispute.id, true).unwrap();
    assert_eq!(closed.state, DisputeState::Closed);
    assert!(closed.buyer_accepted);
    let order = m.service.order(&buyer, order_id).unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Complete);
    assert_eq!(order.dispute_status, DisputeStatus::Closed);

    assert_eq!(m.service.disputes_for(&buyer).len(), 1);
    assert!(m.service.disputes_for(&Actor::farmer(UserId::new())).is_empty());
    assert_eq!(m.service.disputes_for(&m.admin).len(), 1);
}

#[test]
fn active_dispute_freezes_item_transitions() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "millet", 10);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::Prepaid);
    m.service.accept_order(&farmer, order_id).unwrap();
    m.service
        .transition_item(&farmer, order_id, pid, ItemStatus::Shipped, None)
        .unwrap();
    m.service
        .open_dispute(&buyer, order_id, Market::filing(DisputeType::NonDelivery))
        .unwrap();

    m.clock.advance_minutes(15);
    let err = m
        .service
        .transition_item(&farmer, order_id, pid, ItemStatus::Delivered, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("active dispute"), "{err}");
}

// ---------------------------------------------------------------------------
// Seller rejection
// ---------------------------------------------------------------------------

#[test]
fn rejection_cancels_and_settles_payment() {
    for (method, expected) in [
        (PaymentMethod::CashOnDelivery, PaymentStatus::Cancelled),
        (PaymentMethod::Prepaid, PaymentStatus::Refunded),
    ] {
        let m = market();
        let buyer = Actor::buyer(UserId::new());
        let farmer = Actor::farmer(UserId::new());
        let pid = m.list(&farmer, "plantain", 3);
        let order_id = m.order_one(&buyer, pid, method);
        assert_eq!(m.catalog.available(pid), Some(2));

        let err = m.service.reject_order(&farmer, order_id, "  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let order = m.service.reject_order(&farmer, order_id, "out of stock").unwrap();
        assert_eq!(order.items[0].status, ItemStatus::Rejected);
        assert_eq!(order.items[0].rejection_reason.as_deref(), Some("out of stock"));
        assert_eq!(order.order_status, OrderStatus::Cancelled);
        assert_eq!(order.payment_status, expected);
        assert_eq!(m.catalog.available(pid), Some(3));
    }
}

#[test]
fn partial_rejection_uses_derived_status() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let supplier = Actor::supplier(UserId::new());
    let produce = m.list(&farmer, "maize", 10);
    let seed = m.list(&supplier, "hybrid seed", 10);
    let order = m
        .service
        .place_order(
            &buyer,
            &[
                OrderLine {
                    product_id: produce,
                    quantity: 2,
                },
                OrderLine {
                    product_id: seed,
                    quantity: 1,
                },
            ],
            PaymentMethod::Prepaid,
        )
        .unwrap();

    let after_reject = m.service.reject_order(&supplier, order.id, "discontinued").unwrap();
    assert_eq!(after_reject.order_status, OrderStatus::PartiallyCancelled);
    assert_eq!(after_reject.payment_status, PaymentStatus::Pending);

    let after_accept = m.service.accept_order(&farmer, order.id).unwrap();
    assert_eq!(after_accept.item(produce).unwrap().status, ItemStatus::Processing);
    assert_eq!(after_accept.order_status, OrderStatus::PartiallyCancelled);

    let err = m.service.accept_order(&supplier, order.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

// ---------------------------------------------------------------------------
// Placement, cancellation and isolation
// ---------------------------------------------------------------------------

#[test]
fn failed_placement_returns_reserved_stock() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let plenty = m.list(&farmer, "rice", 10);
    let scarce = m.list(&farmer, "saffron", 1);

    let err = m
        .service
        .place_order(
            &buyer,
            &[
                OrderLine {
                    product_id: plenty,
                    quantity: 4,
                },
                OrderLine {
                    product_id: scarce,
                    quantity: 2,
                },
            ],
            PaymentMethod::Prepaid,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(m.catalog.available(plenty), Some(10));
    assert_eq!(m.catalog.available(scarce), Some(1));
    assert!(m.service.state().orders.is_empty());

    let err = m
        .service
        .place_order(
            &buyer,
            &[OrderLine {
                product_id: ProductId::new(),
                quantity: 1,
            }],
            PaymentMethod::Prepaid,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn customer_cancellation_restores_stock() {
    let m = market();
    let buyer = Actor::farmer(UserId::new());
    let supplier = Actor::supplier(UserId::new());
    let pid = m.list(&supplier, "knapsack sprayer", 4);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::CashOnDelivery);
    assert_eq!(m.catalog.available(pid), Some(3));

    let err = m.service.cancel_order(&supplier, order_id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    let order = m.service.cancel_order(&buyer, order_id).unwrap();
    assert_eq!(order.order_status, OrderStatus::Cancelled);
    assert_eq!(order.payment_status, PaymentStatus::Cancelled);
    assert_eq!(m.catalog.available(pid), Some(4));

    let err = m.service.cancel_order(&buyer, order_id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn corrupt_record_fails_alone_in_sweep() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "sesame", 10);

    let healthy = m.order_one(&buyer, pid, PaymentMethod::Prepaid);
    let broken = m.order_one(&buyer, pid, PaymentMethod::Prepaid);
    for order_id in [healthy, broken] {
        m.deliver(&farmer, order_id, pid);
        m.service
            .open_dispute(&buyer, order_id, Market::filing(DisputeType::ProductFault))
            .unwrap();
    }

    // The stored order no longer matches its disputes.
    let mut file = m.service.state().file(broken).unwrap();
    file.order.id = OrderId::new();
    m.service.state().orders.insert(*broken.as_uuid(), file);

    m.clock.advance_minutes(10);
    let report = m.service.run_escalation_sweep();
    assert_eq!((report.examined, report.applied, report.failed), (2, 1, 1));
    assert!(report.has_failures());

    let healthy_file = m.service.state().file(healthy).unwrap();
    assert_eq!(healthy_file.disputes[0].state, DisputeState::PendingAdminReview);
    let broken_file = m.service.state().orders.get(broken.as_uuid()).unwrap();
    assert_eq!(broken_file.disputes[0].state, DisputeState::Open);

    // The next run still happens and fails the same record only.
    m.clock.advance_minutes(1);
    let report = m.service.run_escalation_sweep();
    assert_eq!((report.examined, report.failed), (1, 1));
}

#[test]
fn concurrent_receipt_confirmation_commits_once() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "sweet potato", 10);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::CashOnDelivery);
    m.deliver(&farmer, order_id, pid);

    let successes: usize = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = m.service.clone();
                s.spawn(move || service.confirm_receipt(&buyer, order_id).is_ok())
            })
            .collect();
        handles.into_iter().map(|h| usize::from(h.join().unwrap())).sum()
    });
    assert_eq!(successes, 1);

    let receipts = m
        .trail
        .for_order(order_id)
        .into_iter()
        .filter(|h| h.change_type == HistoryChange::ReceiptConfirmed)
        .count();
    assert_eq!(receipts, 1);
}

#[test]
fn worker_tick_drives_both_sweeps() {
    let m = market();
    let buyer = Actor::buyer(UserId::new());
    let farmer = Actor::farmer(UserId::new());
    let pid = m.list(&farmer, "cowpea", 10);
    let order_id = m.order_one(&buyer, pid, PaymentMethod::CashOnDelivery);
    m.deliver(&farmer, order_id, pid);

    let mut worker = SweepWorker::new(m.service.clone());
    worker.tick();
    m.clock.advance_minutes(10);
    let reports = worker.tick();
    let confirm = reports
        .iter()
        .find(|r| r.task == TaskKind::OrderAutoConfirmation)
        .unwrap();
    assert_eq!(confirm.applied, 1);
    assert_eq!(
        m.service.order(&buyer, order_id).unwrap().order_status,
        OrderStatus::Received
    );
}

#[test]
fn seller_of_listing_is_snapshotted() {
    let m = market();
    let supplier = Actor::supplier(UserId::new());
    let pid = m.list(&supplier, "drip kit", 2);
    let order_id = m.order_one(&Actor::farmer(UserId::new()), pid, PaymentMethod::Prepaid);
    let order = m.service.order(&supplier, order_id).unwrap();
    assert_eq!(order.items[0].seller, Seller::Supplier(supplier.user_id));
}
