//! Domain validation errors.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The minimum profit threshold must not be negative.
    #[error("minimum profit threshold must be 0 or greater, got {value}")]
    NegativeThreshold {
        /// The rejected threshold.
        value: rust_decimal::Decimal,
    },

    /// Sort key names are a closed set.
    #[error("unknown sort key '{value}' (expected profit, net_profit, liquidity or recent)")]
    UnknownSortKey {
        /// The rejected name.
        value: String,
    },
}
