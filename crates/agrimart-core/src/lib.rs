#![deny(missing_docs)]

//! # agrimart-core - Foundational Types for the Agrimart Marketplace
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** You cannot pass a [`DisputeId`]
//!    where an [`OrderId`] is expected.
//!
//! 2. **Sellers are a tagged value.** A line item is owned by exactly one of a
//!    farmer or a supplier, expressed as [`Seller`] rather than two optional
//!    fields that could both be set.
//!
//! 3. **Time is injected.** Business logic takes a [`Timestamp`] or a
//!    [`Clock`]; nothing below the binary reads the wall clock directly.
//!
//! 4. **Configuration is typed and loaded once.** [`MarketConfig`] carries
//!    every timer with its default baked in.

pub mod config;
pub mod error;
pub mod identity;
pub mod temporal;

pub use config::{ConfigKey, MarketConfig, SharedConfig};
pub use error::{ConfigError, ValidationError};
pub use identity::{Actor, Customer, CustomerKind, DisputeId, OrderId, ProductId, Role, Seller, UserId};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
