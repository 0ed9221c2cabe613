//! # Market Service
//!
//! The operations callers invoke on orders and disputes, plus the two
//! scheduled sweeps.
//!
//! ## Commit protocol
//!
//! ```text
//!   try_update(order file) ── clone ── state machine on the clone ──┐
//!                                                                    │
//!         Err: clone dropped, stored file untouched ◄────────────────┤
//!         Ok:  events drained, clone replaces stored file ◄──────────┘
//!                     │
//!                     ▼   (lock released)
//!         stock release + EventDispatcher::dispatch
//! ```
//!
//! Every rejected operation therefore leaves the stored record exactly as
//! it was, and side effects only ever see committed state.

use std::sync::Arc;

use agrimart_agentic::{
    select_due_confirmations, select_overdue_disputes, EventDispatcher, SweepOutcome, SweepReport, TaskKind,
};
use agrimart_arbitration::{Dispute, DisputeFiling, RulingDecision};
use agrimart_core::{
    Actor, Clock, ConfigKey, DisputeId, MarketConfig, OrderId, ProductId, SharedConfig, Timestamp, ValidationError,
};
use agrimart_state::{DomainEvent, ItemStatus, NewLineItem, Order, PaymentMethod};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::catalog::ProductCatalog;
use crate::error::MarketError;
use crate::state::{MarketState, OrderFile};
use crate::telemetry::ServiceMetrics;

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Orchestrates the order and dispute state machines over shared state.
#[derive(Clone)]
pub struct MarketService {
    state: MarketState,
    config: SharedConfig,
    catalog: Arc<dyn ProductCatalog>,
    dispatcher: EventDispatcher,
    clock: Arc<dyn Clock>,
    metrics: ServiceMetrics,
}

impl std::fmt::Debug for MarketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketService")
            .field("orders", &self.state.orders.len())
            .field("config", &self.config.snapshot())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl MarketService {
    pub fn new(
        state: MarketState,
        config: SharedConfig,
        catalog: Arc<dyn ProductCatalog>,
        dispatcher: EventDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state,
            config,
            catalog,
            dispatcher,
            clock,
            metrics: ServiceMetrics::new(),
        }
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    pub fn catalog(&self) -> &Arc<dyn ProductCatalog> {
        &self.catalog
    }

    /// The current configuration.
    pub fn config(&self) -> MarketConfig {
        self.config.snapshot()
    }

    /// The service clock's reading.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // ── Orders ───────────────────────────────────────────────────────

    /// Place an order, reserving catalog stock for every line.
    ///
    /// Prices and sellers are taken from the catalog. If any line cannot be
    /// reserved, stock already reserved for earlier lines is returned.
    pub fn place_order(
        &self,
        actor: &Actor,
        lines: &[OrderLine],
        payment_method: PaymentMethod,
    ) -> Result<Order, MarketError> {
        let outcome = self.build_order(actor, lines, payment_method).map(|mut order| {
            let events = order.take_events();
            self.state.insert_file(OrderFile::new(order.clone()));
            tracing::info!(order_id = %order.id, customer = %actor, items = order.items.len(), "order placed");
            (order, events)
        });
        self.finish("place_order", outcome)
    }

    fn build_order(
        &self,
        actor: &Actor,
        lines: &[OrderLine],
        payment_method: PaymentMethod,
    ) -> Result<Order, MarketError> {
        let customer = auth::require_customer(actor)?;
        if lines.is_empty() {
            return Err(ValidationError::EmptyField { field: "products" }.into());
        }
        let now = self.clock.now();

        let mut reserved: Vec<OrderLine> = Vec::with_capacity(lines.len());
        let mut new_lines = Vec::with_capacity(lines.len());
        for line in lines {
            match self.reserve_line(line, now) {
                Ok(new_line) => {
                    reserved.push(*line);
                    new_lines.push(new_line);
                }
                Err(err) => {
                    self.rollback(&reserved);
                    return Err(err);
                }
            }
        }

        Order::place(customer, new_lines, payment_method, now).map_err(|err| {
            self.rollback(&reserved);
            MarketError::from(err)
        })
    }

    fn reserve_line(&self, line: &OrderLine, now: Timestamp) -> Result<NewLineItem, MarketError> {
        if line.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(0).into());
        }
        let product = self.catalog.product(line.product_id)?;
        self.catalog.reserve(line.product_id, line.quantity)?;
        Ok(NewLineItem {
            product_id: product.id,
            quantity: line.quantity,
            unit_price: product.unit_price,
            seller: product.seller,
            estimated_delivery: product.delivery_days.map(|days| now.plus_days(i64::from(days))),
        })
    }

    fn rollback(&self, reserved: &[OrderLine]) {
        for line in reserved {
            if let Err(e) = self.catalog.release(line.product_id, line.quantity) {
                tracing::error!(product = %line.product_id, quantity = line.quantity, error = %e, "failed to return reserved stock");
            }
        }
    }

    /// Move one line item to `status`. Only its seller or an admin may.
    pub fn transition_item(
        &self,
        actor: &Actor,
        order_id: OrderId,
        product_id: ProductId,
        status: ItemStatus,
        reason: Option<&str>,
    ) -> Result<Order, MarketError> {
        self.commit(
            "transition_item",
            order_id,
            |file, now, config| {
                file.order.transition_item(product_id, status, actor, reason, now, config)?;
                Ok(())
            },
            |file| file.order.clone(),
        )
    }

    /// The calling seller accepts all of their pending items.
    pub fn accept_order(&self, actor: &Actor, order_id: OrderId) -> Result<Order, MarketError> {
        self.commit(
            "accept_order",
            order_id,
            |file, now, _| {
                let n = file.order.accept(actor, now)?;
                tracing::info!(%order_id, seller = %actor, items = n, "items accepted");
                Ok(())
            },
            |file| file.order.clone(),
        )
    }

    /// The calling seller rejects all of their pending items.
    pub fn reject_order(&self, actor: &Actor, order_id: OrderId, reason: &str) -> Result<Order, MarketError> {
        self.commit(
            "reject_order",
            order_id,
            |file, now, _| {
                let n = file.order.reject(actor, reason, now)?;
                tracing::info!(%order_id, seller = %actor, items = n, "items rejected");
                Ok(())
            },
            |file| file.order.clone(),
        )
    }

    /// The customer cancels every item that has not shipped.
    pub fn cancel_order(&self, actor: &Actor, order_id: OrderId) -> Result<Order, MarketError> {
        self.commit(
            "cancel_order",
            order_id,
            |file, now, _| {
                let n = file.order.cancel(actor, now)?;
                tracing::info!(%order_id, items = n, "items cancelled by customer");
                Ok(())
            },
            |file| file.order.clone(),
        )
    }

    /// The customer confirms receipt of a delivered order.
    pub fn confirm_receipt(&self, actor: &Actor, order_id: OrderId) -> Result<Order, MarketError> {
        self.commit(
            "confirm_receipt",
            order_id,
            |file, now, _| Ok(file.order.confirm_receipt(actor, now)?),
            |file| file.order.clone(),
        )
    }

    /// Read one order. Visible to its customer, its sellers and admins.
    pub fn order(&self, actor: &Actor, order_id: OrderId) -> Result<Order, MarketError> {
        let file = self.require_file(order_id)?;
        if !auth::can_view_order(actor, &file.order) {
            return Err(MarketError::Forbidden(format!("{actor} is not a party to order {order_id}")));
        }
        Ok(file.order)
    }

    /// Every order the caller can see, oldest first.
    pub fn orders_for(&self, actor: &Actor) -> Vec<Order> {
        self.state
            .files()
            .into_iter()
            .map(|f| f.order)
            .filter(|o| auth::can_view_order(actor, o))
            .collect()
    }

    // ── Disputes ─────────────────────────────────────────────────────

    /// The customer opens a dispute on a shipped order.
    pub fn open_dispute(&self, actor: &Actor, order_id: OrderId, filing: DisputeFiling) -> Result<Dispute, MarketError> {
        let dispute = self
            .commit(
                "open_dispute",
                order_id,
                |file, now, config| {
                    let dispute = Dispute::open(&mut file.order, actor, filing, now, config)?;
                    file.disputes.push(dispute);
                    Ok(())
                },
                |file| file.disputes.last().cloned(),
            )?
            .ok_or_else(|| MarketError::Internal(format!("order {order_id}: opened dispute missing after commit")))?;
        self.state.index_dispute(dispute.id, order_id);
        Ok(dispute)
    }

    /// The disputed seller responds once with evidence and a proposal.
    pub fn respond_dispute(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
        evidence: Vec<String>,
        proposal: &str,
    ) -> Result<Dispute, MarketError> {
        self.commit_dispute("respond_dispute", dispute_id, |order, dispute, now, _| {
            Ok(dispute.respond(order, actor, evidence, proposal, now)?)
        })
    }

    /// The buyer accepts or rejects the seller's proposal.
    pub fn resolve_dispute(&self, actor: &Actor, dispute_id: DisputeId, accept: bool) -> Result<Dispute, MarketError> {
        self.commit_dispute("resolve_dispute", dispute_id, |order, dispute, now, _| {
            Ok(dispute.resolve(order, actor, accept, now)?)
        })
    }

    /// An admin rules on an escalated dispute.
    pub fn rule_dispute(
        &self,
        actor: &Actor,
        dispute_id: DisputeId,
        decision: RulingDecision,
        notes: &str,
    ) -> Result<Dispute, MarketError> {
        self.commit_dispute("rule_dispute", dispute_id, |order, dispute, now, _| {
            Ok(dispute.rule(order, actor, decision, notes, now)?)
        })
    }

    /// Read one dispute. Visible to its buyer, its seller and admins.
    pub fn dispute(&self, actor: &Actor, dispute_id: DisputeId) -> Result<Dispute, MarketError> {
        let order_id = self.require_dispute_order(dispute_id)?;
        let file = self.require_file(order_id)?;
        let dispute = file
            .dispute(dispute_id)
            .cloned()
            .ok_or_else(|| MarketError::NotFound(format!("dispute {dispute_id}")))?;
        if !auth::can_view_dispute(actor, &dispute) {
            return Err(MarketError::Forbidden(format!("{actor} is not a party to dispute {dispute_id}")));
        }
        Ok(dispute)
    }

    /// Disputes raised on one order.
    pub fn disputes_for_order(&self, actor: &Actor, order_id: OrderId) -> Result<Vec<Dispute>, MarketError> {
        let file = self.require_file(order_id)?;
        if !auth::can_view_order(actor, &file.order) {
            return Err(MarketError::Forbidden(format!("{actor} is not a party to order {order_id}")));
        }
        Ok(file
            .disputes
            .into_iter()
            .filter(|d| auth::can_view_dispute(actor, d))
            .collect())
    }

    /// Every dispute the caller takes part in. Admins see all of them.
    pub fn disputes_for(&self, actor: &Actor) -> Vec<Dispute> {
        self.state
            .files()
            .into_iter()
            .flat_map(|f| f.disputes)
            .filter(|d| auth::can_view_dispute(actor, d))
            .collect()
    }

    // ── Sweeps ───────────────────────────────────────────────────────

    /// Escalate every open dispute whose seller missed the response deadline.
    pub fn run_escalation_sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let config = self.config.snapshot();
        let files = self.state.files();
        let candidates = select_overdue_disputes(files.iter().flat_map(|f| f.disputes.iter()), now, &config);

        let mut report = SweepReport::new(TaskKind::DisputeEscalation, now);
        for (order_id, dispute_id) in candidates {
            let outcome = self.sweep_one(TaskKind::DisputeEscalation, order_id, |file| {
                let Some((order, dispute)) = file.split_mut(dispute_id) else {
                    return Ok(false);
                };
                if !dispute.is_overdue(now, &config) {
                    return Ok(false);
                }
                dispute.escalate(order, now, &config)?;
                Ok(true)
            });
            report.record(outcome);
        }
        self.finish_sweep(&report);
        report
    }

    /// Confirm receipt of every delivered order whose window has elapsed.
    pub fn run_confirmation_sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let config = self.config.snapshot();
        let files = self.state.files();
        let candidates = select_due_confirmations(files.iter().map(|f| &f.order), now, &config);

        let mut report = SweepReport::new(TaskKind::OrderAutoConfirmation, now);
        for order_id in candidates {
            let outcome = self.sweep_one(TaskKind::OrderAutoConfirmation, order_id, |file| {
                if !file.order.is_due_for_auto_confirm(now, &config) {
                    return Ok(false);
                }
                file.order.auto_confirm(now, &config)?;
                Ok(true)
            });
            report.record(outcome);
        }
        self.finish_sweep(&report);
        report
    }

    /// Run one scheduled task.
    pub fn run_task(&self, kind: TaskKind) -> SweepReport {
        match kind {
            TaskKind::DisputeEscalation => self.run_escalation_sweep(),
            TaskKind::OrderAutoConfirmation => self.run_confirmation_sweep(),
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Change one configuration value. Admin only.
    pub fn update_config(&self, actor: &Actor, key: ConfigKey, value: u32) -> Result<MarketConfig, MarketError> {
        let outcome = auth::require_admin(actor, "change configuration")
            .and_then(|()| self.config.set(key, value).map_err(MarketError::from))
            .map(|()| (self.config.snapshot(), Vec::new()));
        self.finish("update_config", outcome)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn require_file(&self, order_id: OrderId) -> Result<OrderFile, MarketError> {
        self.state
            .file(order_id)
            .ok_or_else(|| MarketError::NotFound(format!("order {order_id}")))
    }

    fn require_dispute_order(&self, dispute_id: DisputeId) -> Result<OrderId, MarketError> {
        self.state
            .order_for_dispute(dispute_id)
            .ok_or_else(|| MarketError::NotFound(format!("dispute {dispute_id}")))
    }

    /// Apply `apply` to a copy of the order file and store the copy only if
    /// it succeeds. `view` projects the result from the committed file.
    fn commit<R>(
        &self,
        operation: &'static str,
        order_id: OrderId,
        apply: impl FnOnce(&mut OrderFile, Timestamp, &MarketConfig) -> Result<(), MarketError>,
        view: impl FnOnce(&OrderFile) -> R,
    ) -> Result<R, MarketError> {
        let now = self.clock.now();
        let config = self.config.snapshot();
        let outcome = self
            .state
            .orders
            .try_update(order_id.as_uuid(), |file| {
                let mut draft = file.clone();
                apply(&mut draft, now, &config)?;
                let events = draft.order.take_events();
                *file = draft;
                Ok::<_, MarketError>((view(file), events))
            })
            .unwrap_or_else(|| Err(MarketError::NotFound(format!("order {order_id}"))));
        self.finish(operation, outcome)
    }

    fn commit_dispute(
        &self,
        operation: &'static str,
        dispute_id: DisputeId,
        apply: impl FnOnce(&mut Order, &mut Dispute, Timestamp, &MarketConfig) -> Result<(), MarketError>,
    ) -> Result<Dispute, MarketError> {
        let order_id = match self.require_dispute_order(dispute_id) {
            Ok(id) => id,
            Err(err) => {
                self.metrics.record_rejection(operation, err.code());
                return Err(err);
            }
        };
        self.commit(
            operation,
            order_id,
            |file, now, config| {
                let (order, dispute) = file
                    .split_mut(dispute_id)
                    .ok_or_else(|| MarketError::NotFound(format!("dispute {dispute_id}")))?;
                apply(order, dispute, now, config)
            },
            |file| file.dispute(dispute_id).cloned(),
        )?
        .ok_or_else(|| MarketError::Internal(format!("dispute {dispute_id} missing after commit")))
    }

    fn finish<R>(&self, operation: &'static str, outcome: Result<(R, Vec<DomainEvent>), MarketError>) -> Result<R, MarketError> {
        match outcome {
            Ok((value, events)) => {
                self.metrics.record_commit(operation);
                self.publish(events);
                Ok(value)
            }
            Err(err) => {
                self.metrics.record_rejection(operation, err.code());
                tracing::debug!(operation, code = err.code(), error = %err, "operation rejected");
                Err(err)
            }
        }
    }

    fn sweep_one(
        &self,
        task: TaskKind,
        order_id: OrderId,
        apply: impl FnOnce(&mut OrderFile) -> Result<bool, MarketError>,
    ) -> SweepOutcome {
        let outcome = self.state.orders.try_update(order_id.as_uuid(), |file| {
            let mut draft = file.clone();
            if !apply(&mut draft)? {
                return Ok(None);
            }
            let events = draft.order.take_events();
            *file = draft;
            Ok::<_, MarketError>(Some(events))
        });
        match outcome {
            Some(Ok(Some(events))) => {
                self.publish(events);
                SweepOutcome::Applied
            }
            None | Some(Ok(None)) => {
                tracing::debug!(%task, %order_id, "sweep candidate no longer qualifies");
                SweepOutcome::Skipped
            }
            Some(Err(err)) => {
                tracing::warn!(%task, %order_id, error = %err, "sweep candidate failed; continuing");
                SweepOutcome::Failed
            }
        }
    }

    fn finish_sweep(&self, report: &SweepReport) {
        self.metrics.record_sweep(report);
        if report.examined > 0 {
            tracing::info!(
                task = %report.task,
                examined = report.examined,
                applied = report.applied,
                skipped = report.skipped,
                failed = report.failed,
                "sweep finished"
            );
        }
    }

    /// Side effects of committed events. Failures are logged and counted.
    fn publish(&self, events: Vec<DomainEvent>) {
        if events.is_empty() {
            return;
        }
        let mut failures = 0u64;
        for event in &events {
            if let DomainEvent::StockReleased {
                order_id,
                product_id,
                quantity,
            } = event
            {
                if let Err(e) = self.catalog.release(*product_id, *quantity) {
                    failures += 1;
                    tracing::warn!(%order_id, product = %product_id, quantity, error = %e, "stock release failed");
                }
            }
        }
        let report = self.dispatcher.dispatch(events);
        failures += (report.history_failed + report.notify_failed) as u64;
        self.metrics.record_side_effect_failures(failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, Product};
    use agrimart_agentic::{HistoryTrail, RecordingNotifier};
    use agrimart_core::{ManualClock, Seller, UserId};
    use chrono::{TimeZone, Utc};

    struct Fixture {
        service: MarketService,
        catalog: Arc<InMemoryCatalog>,
        clock: Arc<ManualClock>,
        buyer: Actor,
        farmer: Actor,
        product: Product,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(Timestamp::from_utc(
            Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap(),
        )));
        let farmer = Actor::farmer(UserId::new());
        let product = Product {
            id: ProductId::new(),
            name: "sorghum".into(),
            seller: Seller::Farmer(farmer.user_id),
            unit_price: 1_500,
            available: 20,
            delivery_days: Some(2),
        };
        let catalog = Arc::new(InMemoryCatalog::from_products([product.clone()]));
        let dispatcher = EventDispatcher::new(
            Arc::new(HistoryTrail::default()),
            Arc::new(RecordingNotifier::new()),
            vec![],
        );
        let service = MarketService::new(
            MarketState::new(),
            SharedConfig::default(),
            catalog.clone(),
            dispatcher,
            clock.clone(),
        );
        Fixture {
            service,
            catalog,
            clock,
            buyer: Actor::buyer(UserId::new()),
            farmer,
            product,
        }
    }

    #[test]
    fn placement_snapshots_catalog_price_and_seller() {
        let f = fixture();
        let order = f
            .service
            .place_order(
                &f.buyer,
                &[OrderLine {
                    product_id: f.product.id,
                    quantity: 4,
                }],
                PaymentMethod::CashOnDelivery,
            )
            .unwrap();
        assert_eq!(order.items[0].unit_price, 1_500);
        assert_eq!(order.items[0].seller, f.product.seller);
        assert_eq!(order.items[0].estimated_delivery, Some(f.clock.now().plus_days(2)));
        assert!(order.pending_events().is_empty());
        assert_eq!(f.catalog.available(f.product.id), Some(16));
    }

    #[test]
    fn suppliers_cannot_place_orders() {
        let f = fixture();
        let err = f
            .service
            .place_order(
                &Actor::supplier(UserId::new()),
                &[OrderLine {
                    product_id: f.product.id,
                    quantity: 1,
                }],
                PaymentMethod::Prepaid,
            )
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(f.catalog.available(f.product.id), Some(20));
    }

    #[test]
    fn zero_quantity_reserves_nothing() {
        let f = fixture();
        let err = f
            .service
            .place_order(
                &f.buyer,
                &[
                    OrderLine {
                        product_id: f.product.id,
                        quantity: 2,
                    },
                    OrderLine {
                        product_id: f.product.id,
                        quantity: 0,
                    },
                ],
                PaymentMethod::Prepaid,
            )
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(f.catalog.available(f.product.id), Some(20));
    }

    #[test]
    fn rejected_transition_leaves_record_untouched() {
        let f = fixture();
        let order = f
            .service
            .place_order(
                &f.buyer,
                &[OrderLine {
                    product_id: f.product.id,
                    quantity: 1,
                }],
                PaymentMethod::Prepaid,
            )
            .unwrap();
        let before = f.service.state().file(order.id).unwrap().order;
        let err = f
            .service
            .transition_item(&f.farmer, order.id, f.product.id, ItemStatus::Shipped, None)
            .unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        let after = f.service.state().file(order.id).unwrap().order;
        assert_eq!(before.version, after.version);
        assert_eq!(after.items[0].status, ItemStatus::Pending);
        assert_eq!(f.service.metrics().rejected(), 1);
    }

    #[test]
    fn unknown_records_are_not_found() {
        let f = fixture();
        let err = f.service.accept_order(&f.farmer, OrderId::new()).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        let err = f.service.resolve_dispute(&f.buyer, DisputeId::new(), true).unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn strangers_cannot_read_orders() {
        let f = fixture();
        let order = f
            .service
            .place_order(
                &f.buyer,
                &[OrderLine {
                    product_id: f.product.id,
                    quantity: 1,
                }],
                PaymentMethod::Prepaid,
            )
            .unwrap();
        assert!(f.service.order(&f.buyer, order.id).is_ok());
        assert!(f.service.order(&f.farmer, order.id).is_ok());
        assert!(f.service.order(&Actor::admin(UserId::new()), order.id).is_ok());
        let stranger = Actor::buyer(UserId::new());
        assert_eq!(f.service.order(&stranger, order.id).unwrap_err().code(), "FORBIDDEN");
        assert!(f.service.orders_for(&stranger).is_empty());
    }

    #[test]
    fn only_admins_change_configuration() {
        let f = fixture();
        let err = f
            .service
            .update_config(&f.buyer, ConfigKey::DisputeResponseMinutes, 30)
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        let cfg = f
            .service
            .update_config(&Actor::admin(UserId::new()), ConfigKey::DisputeResponseMinutes, 30)
            .unwrap();
        assert_eq!(cfg.dispute_response_minutes, 30);
        assert_eq!(f.service.config().dispute_response_minutes, 30);
        let err = f
            .service
            .update_config(&Actor::admin(UserId::new()), ConfigKey::DisputeResponseMinutes, 0)
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn oversized_delivery_estimate_is_refused() {
        let f = fixture();
        let admin = Actor::admin(UserId::new());
        let err = f
            .service
            .update_config(&admin, ConfigKey::DefaultDeliveryEstimateDays, u32::MAX)
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(f.service.config().default_delivery_estimate_days, 7);
    }
}
