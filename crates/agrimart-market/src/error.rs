//! # Market Error Types
//!
//! One error type for every service operation. Domain errors from the
//! order and dispute state machines are folded into five kinds, each with a
//! stable machine-readable code for callers that route on it.

use thiserror::Error;

use agrimart_arbitration::ArbitrationError;
use agrimart_core::{ConfigError, ValidationError};
use agrimart_state::OrderError;

use crate::catalog::CatalogError;

/// Error classes callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input. Never worth retrying unchanged.
    Validation,
    /// Wrong role, or not a party to the record.
    Authorization,
    /// Illegal in the record's current state. May succeed later.
    Conflict,
    /// Order, dispute or product missing.
    NotFound,
    /// Unexpected failure.
    Internal,
}

/// Service-level error.
///
/// Every rejected operation leaves the stored record exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// The error's class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Forbidden(_) => ErrorKind::Authorization,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Authorization => "FORBIDDEN",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl From<ValidationError> for MarketError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ConfigError> for MarketError {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. } | ConfigError::OutOfRange { .. } => {
                Self::Validation(err.to_string())
            }
            ConfigError::Io { .. } | ConfigError::Parse { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for MarketError {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::NotFound(_) => Self::NotFound(err.to_string()),
            CatalogError::InsufficientStock { .. } => Self::Conflict(err.to_string()),
        }
    }
}

impl From<OrderError> for MarketError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::Validation(_) => Self::Validation(err.to_string()),
            OrderError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            OrderError::ItemNotFound { .. } => Self::NotFound(err.to_string()),
            OrderError::InvalidTransition { .. }
            | OrderError::TerminalState { .. }
            | OrderError::DisputeActive { .. }
            | OrderError::DeliveryTooEarly { .. }
            | OrderError::NothingPending { .. }
            | OrderError::NothingToCancel { .. }
            | OrderError::NotAwaitingReceipt { .. }
            | OrderError::AutoConfirmNotDue { .. } => Self::Conflict(err.to_string()),
            OrderError::MissingShipmentTime { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<ArbitrationError> for MarketError {
    fn from(err: ArbitrationError) -> Self {
        match &err {
            ArbitrationError::Validation(_) | ArbitrationError::SellerRequired { .. } => {
                Self::Validation(err.to_string())
            }
            ArbitrationError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            ArbitrationError::SellerNotInOrder { .. } => Self::NotFound(err.to_string()),
            ArbitrationError::InvalidTransition { .. }
            | ArbitrationError::TerminalState { .. }
            | ArbitrationError::AlreadyActive { .. }
            | ArbitrationError::OrderNotEligible { .. }
            | ArbitrationError::WindowClosed { .. }
            | ArbitrationError::AlreadyResponded { .. }
            | ArbitrationError::AwaitingSellerResponse { .. }
            | ArbitrationError::NotOverdue { .. } => Self::Conflict(err.to_string()),
            ArbitrationError::OrderMismatch { .. } => Self::Internal(err.to_string()),
        }
    }
}
