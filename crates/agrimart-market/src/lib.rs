//! # agrimart-market - Marketplace Service Layer
//!
//! Wires the order and dispute state machines to shared storage, the
//! product catalog, and the event dispatcher.
//!
//! ## Architecture
//!
//! ```text
//!   caller ──► MarketService ──► auth checks
//!                  │
//!                  ├─► Store<OrderFile>::try_update ──► Order / Dispute
//!                  │                                    state machines
//!                  └─► (after commit) catalog release, EventDispatcher
//!
//!   SweepWorker ──► TaskScheduler ──► MarketService::run_task
//! ```
//!
//! The service never holds a store lock across an `.await`; every
//! operation is synchronous and the worker is the only async component.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod service;
pub mod snapshot;
pub mod state;
pub mod telemetry;
pub mod worker;

pub use catalog::{CatalogError, InMemoryCatalog, Product, ProductCatalog};
pub use error::{ErrorKind, MarketError};
pub use service::{MarketService, OrderLine};
pub use snapshot::{MarketSnapshot, SnapshotError};
pub use state::{MarketState, OrderFile, Store};
pub use telemetry::ServiceMetrics;
pub use worker::SweepWorker;
