//! # Identity Newtypes and Marketplace Actors
//!
//! Identifiers are distinct types over a UUID. Actors are the
//! `{user_id, role}` fact supplied by the external authentication layer;
//! this crate never authenticates anyone, it only carries the fact.
//!
//! ## Ownership shapes
//!
//! - [`Seller`] is the owner of a line item: a farmer **or** a supplier,
//!   never both and never neither.
//! - [`Customer`] is whoever placed an order: a buyer, or a farmer buying
//!   inputs from a supplier.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Implements constructors, `Display` with a namespace prefix, and `FromStr`
/// for a UUID-backed identifier.
macro_rules! uuid_identifier {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ValidationError;

            /// Accepts either a bare UUID or the prefixed display form.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, ":")).unwrap_or(s);
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidIdentifier {
                        kind: $prefix,
                        value: s.to_string(),
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// A marketplace user (buyer, farmer, supplier or admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

/// An order placed by a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(Uuid);

/// A dispute raised against an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisputeId(Uuid);

/// A catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(Uuid);

uuid_identifier!(UserId, "user");
uuid_identifier!(OrderId, "order");
uuid_identifier!(DisputeId, "dispute");
uuid_identifier!(ProductId, "product");

// ---------------------------------------------------------------------------
// Roles and actors
// ---------------------------------------------------------------------------

/// Marketplace roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Purchases produce.
    Buyer,
    /// Sells produce; may also buy from suppliers.
    Farmer,
    /// Sells agricultural inputs.
    Supplier,
    /// Marketplace operator. Rules on escalated disputes.
    Admin,
}

impl Role {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Farmer => "farmer",
            Self::Supplier => "supplier",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "farmer" => Ok(Self::Farmer),
            "supplier" => Ok(Self::Supplier),
            "admin" => Ok(Self::Admin),
            _ => Err(ValidationError::InvalidRole(s.to_string())),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's user id.
    pub user_id: UserId,
    /// The caller's role.
    pub role: Role,
}

impl Actor {
    /// Build an actor from its parts.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// A buyer actor.
    pub fn buyer(user_id: UserId) -> Self {
        Self::new(user_id, Role::Buyer)
    }

    /// A farmer actor.
    pub fn farmer(user_id: UserId) -> Self {
        Self::new(user_id, Role::Farmer)
    }

    /// A supplier actor.
    pub fn supplier(user_id: UserId) -> Self {
        Self::new(user_id, Role::Supplier)
    }

    /// An admin actor.
    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    /// Whether the actor holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The seller identity this actor would own items as, if any.
    pub fn as_seller(&self) -> Option<Seller> {
        match self.role {
            Role::Farmer => Some(Seller::Farmer(self.user_id)),
            Role::Supplier => Some(Seller::Supplier(self.user_id)),
            Role::Buyer | Role::Admin => None,
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.role, self.user_id.as_uuid())
    }
}

// ---------------------------------------------------------------------------
// Ownership shapes
// ---------------------------------------------------------------------------

/// The owner of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Seller {
    /// A farmer selling produce.
    Farmer(UserId),
    /// A supplier selling inputs.
    Supplier(UserId),
}

impl Seller {
    /// The seller's user id.
    pub fn user_id(&self) -> UserId {
        match self {
            Self::Farmer(id) | Self::Supplier(id) => *id,
        }
    }

    /// The role a caller must hold to act as this seller.
    pub fn role(&self) -> Role {
        match self {
            Self::Farmer(_) => Role::Farmer,
            Self::Supplier(_) => Role::Supplier,
        }
    }

    /// Whether `actor` is this seller.
    pub fn is(&self, actor: &Actor) -> bool {
        actor.role == self.role() && actor.user_id == self.user_id()
    }
}

/// Which kind of user placed an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerKind {
    /// A buyer purchasing produce.
    Buyer,
    /// A farmer purchasing supplies.
    Farmer,
}

/// The party who placed an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Customer {
    /// The customer's user id.
    pub id: UserId,
    /// The customer's kind.
    pub kind: CustomerKind,
}

impl Customer {
    /// The customer's role.
    pub fn role(&self) -> Role {
        match self.kind {
            CustomerKind::Buyer => Role::Buyer,
            CustomerKind::Farmer => Role::Farmer,
        }
    }

    /// Whether `actor` is this customer.
    pub fn is(&self, actor: &Actor) -> bool {
        actor.user_id == self.id && actor.role == self.role()
    }

    /// Derive the customer from an actor. Only buyers and farmers may order.
    pub fn from_actor(actor: &Actor) -> Option<Self> {
        let kind = match actor.role {
            Role::Buyer => CustomerKind::Buyer,
            Role::Farmer => CustomerKind::Farmer,
            Role::Supplier | Role::Admin => return None,
        };
        Some(Self {
            id: actor.user_id,
            kind,
        })
    }
}
