//! # Access Checks
//!
//! Role and party checks applied before an operation touches a record.
//! The state machines enforce ownership of the specific items they mutate;
//! these checks gate reads and the operations that have no single owner.

use agrimart_arbitration::Dispute;
use agrimart_core::{Actor, Customer, Role};
use agrimart_state::Order;

use crate::error::MarketError;

/// Require one of `allowed`.
pub fn require_role(actor: &Actor, allowed: &[Role], action: &str) -> Result<(), MarketError> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        Err(MarketError::Forbidden(format!(
            "{action} requires role {}, caller has '{}'",
            names.join(" or "),
            actor.role.as_str()
        )))
    }
}

/// Require an admin.
pub fn require_admin(actor: &Actor, action: &str) -> Result<(), MarketError> {
    require_role(actor, &[Role::Admin], action)
}

/// Require a role that may place orders and return the customer it acts as.
pub fn require_customer(actor: &Actor) -> Result<Customer, MarketError> {
    Customer::from_actor(actor).ok_or_else(|| {
        MarketError::Forbidden(format!("{actor} cannot place orders; only buyers and farmers can"))
    })
}

/// The customer, any seller on the order, or an admin.
pub fn can_view_order(actor: &Actor, order: &Order) -> bool {
    actor.is_admin() || order.customer.is(actor) || order.items.iter().any(|i| i.seller.is(actor))
}

/// The buyer, the disputed seller, or an admin.
pub fn can_view_dispute(actor: &Actor, dispute: &Dispute) -> bool {
    actor.is_admin() || dispute.customer.is(actor) || dispute.seller.is(actor)
}
