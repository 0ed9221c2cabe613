//! # Core Error Types
//!
//! Structured errors for domain primitives and configuration, built with
//! `thiserror`. Higher layers wrap these in their own enums.

use thiserror::Error;

/// Validation errors for domain primitives.
///
/// These carry the rejected input so that operators can diagnose bad data
/// without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier string is not a valid UUID.
    #[error("invalid {kind} identifier: \"{value}\"")]
    InvalidIdentifier {
        /// The identifier namespace (order, dispute, ...).
        kind: &'static str,
        /// The string that failed to parse.
        value: String,
    },

    /// Role string is not one of the marketplace roles.
    #[error("invalid role: \"{0}\" (expected buyer, farmer, supplier or admin)")]
    InvalidRole(String),

    /// Timestamp string is not valid UTC ISO 8601.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A required free-text field was empty or whitespace.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The same product was listed twice with a different seller or price.
    #[error("product {0} appears more than once with a different seller or price")]
    InconsistentLine(String),

    /// A quantity was zero.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),
}

/// Errors while loading or updating [`MarketConfig`](crate::MarketConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The key is not a known configuration key.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// The value for a key is not a positive integer.
    #[error("invalid value for {key}: \"{value}\" (expected a positive integer)")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// The rejected raw value.
        value: String,
    },

    /// The value is above the key's accepted maximum.
    #[error("invalid value for {key}: {value} (maximum is {max})")]
    OutOfRange {
        /// The configuration key.
        key: String,
        /// The rejected value.
        value: u32,
        /// Largest accepted value.
        max: u32,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the config schema.
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}
