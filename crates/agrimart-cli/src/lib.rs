//! # agrimart-cli - Operator Tooling for the Marketplace Core
//!
//! Provides the `agrimart` command-line interface. Every command works on a
//! JSON [`MarketSnapshot`]; there is no server to talk to.
//!
//! ## Subcommands
//!
//! - `agrimart config` - Effective configuration and YAML file checks.
//! - `agrimart sweep` - One escalation and/or auto-confirmation pass.
//! - `agrimart serve` - The sweep worker until ctrl-c, then save.
//! - `agrimart inspect` - Orders, disputes and stock in a snapshot.
//!
//! ```bash
//! agrimart sweep --state market.json --now 2026-09-14T08:00:00Z
//! agrimart -v serve --state market.json --admin 5f0c...
//! agrimart inspect --state market.json disputes --active
//! ```

pub mod config;
pub mod inspect;
pub mod serve;
pub mod sweep;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use agrimart_agentic::{EventDispatcher, HistoryTrail, TracingNotifier};
use agrimart_core::{Clock, MarketConfig, SharedConfig, UserId};
use agrimart_market::{InMemoryCatalog, MarketService, MarketSnapshot};

/// Load the effective configuration: defaults, the optional file, then
/// `AGRIMART_*` environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<MarketConfig> {
    MarketConfig::load(path).context("failed to load marketplace configuration")
}

/// A service rebuilt from a snapshot, with handles to the pieces the CLI
/// writes back out.
pub struct Market {
    pub service: MarketService,
    pub catalog: Arc<InMemoryCatalog>,
    pub history: Arc<HistoryTrail>,
}

impl Market {
    /// Rebuild a service over the snapshot's orders and catalog.
    ///
    /// Notifications go to the log; history entries collect in memory.
    pub fn open(
        snapshot: MarketSnapshot,
        config: MarketConfig,
        clock: Arc<dyn Clock>,
        admins: Vec<UserId>,
    ) -> Self {
        let (state, catalog) = snapshot.restore();
        let catalog = Arc::new(catalog);
        let history = Arc::new(HistoryTrail::default());
        let dispatcher = EventDispatcher::new(history.clone(), Arc::new(TracingNotifier), admins);
        let service = MarketService::new(
            state,
            SharedConfig::new(config),
            catalog.clone(),
            dispatcher,
            clock,
        );
        Self {
            service,
            catalog,
            history,
        }
    }

    /// Capture the current state at the service clock's reading.
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot::capture(self.service.state(), &self.catalog, self.service.now())
    }

    /// Append this run's history entries to `path` as JSON lines.
    pub fn append_history(&self, path: &Path) -> Result<usize> {
        let entries = self.history.entries();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open history file {}", path.display()))?;
        for entry in &entries {
            let line = serde_json::to_string(entry)?;
            writeln!(file, "{line}")
                .with_context(|| format!("failed to write history file {}", path.display()))?;
        }
        Ok(entries.len())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use agrimart_arbitration::{BuyerProof, DisputeFiling, DisputeType};
    use agrimart_core::{Actor, Clock, ManualClock, MarketConfig, OrderId, ProductId, Timestamp, UserId};
    use agrimart_market::{MarketSnapshot, OrderLine, Product};
    use agrimart_state::{ItemStatus, PaymentMethod};
    use chrono::{TimeZone, Utc};

    use super::Market;

    pub(crate) fn t0() -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2026, 9, 14, 7, 30, 0).unwrap())
    }

    /// Write a snapshot holding one delivered, unconfirmed order.
    ///
    /// Returns the snapshot path, the order and the delivery instant.
    pub(crate) fn delivered_snapshot(dir: &Path) -> (PathBuf, OrderId, Timestamp) {
        build(dir, false)
    }

    /// As [`delivered_snapshot`], with an unanswered dispute opened at the
    /// delivery instant.
    pub(crate) fn disputed_snapshot(dir: &Path) -> (PathBuf, OrderId, Timestamp) {
        build(dir, true)
    }

    fn build(dir: &Path, disputed: bool) -> (PathBuf, OrderId, Timestamp) {
        let clock = Arc::new(ManualClock::new(t0()));
        let farmer = Actor::farmer(UserId::new());
        let buyer = Actor::buyer(UserId::new());
        let snapshot = MarketSnapshot {
            taken_at: t0(),
            products: vec![Product {
                id: ProductId::new(),
                name: "yam tubers".into(),
                seller: farmer.as_seller().unwrap(),
                unit_price: 1_800,
                available: 40,
                delivery_days: Some(2),
            }],
            orders: vec![],
        };
        let product_id = snapshot.products[0].id;
        let market = Market::open(snapshot, MarketConfig::default(), clock.clone(), vec![]);

        let order_id = market
            .service
            .place_order(&buyer, &[OrderLine { product_id, quantity: 4 }], PaymentMethod::CashOnDelivery)
            .unwrap()
            .id;
        market.service.accept_order(&farmer, order_id).unwrap();
        market
            .service
            .transition_item(&farmer, order_id, product_id, ItemStatus::Shipped, None)
            .unwrap();
        clock.advance_minutes(10);
        market
            .service
            .transition_item(&farmer, order_id, product_id, ItemStatus::Delivered, None)
            .unwrap();
        let delivered_at = clock.now();
        if disputed {
            let filing = DisputeFiling {
                dispute_type: DisputeType::ProductFault,
                reason: "tubers rotten at the core".into(),
                proof: BuyerProof {
                    images: vec!["https://img.example/yam.jpg".into()],
                    description: "cut open on arrival".into(),
                },
                seller: None,
            };
            market.service.open_dispute(&buyer, order_id, filing).unwrap();
        }

        let path = dir.join("market.json");
        market.snapshot().save(&path).unwrap();
        (path, order_id, delivered_at)
    }
}
