//! Settlement rejection types.

use settle_shared::types::{Money, ObligationId};
use thiserror::Error;

/// Reasons a settlement is refused before any balance is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementRejection {
    /// The obligation has already been paid.
    #[error("Obligation {0} is already settled")]
    AlreadySettled(ObligationId),

    /// The payer cannot cover the price.
    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds {
        /// Payer balance at the time of the check.
        available: Money,
        /// Price of the obligation.
        required: Money,
    },

    /// Stored price is zero or negative.
    #[error("Obligation price must be positive, got {0}")]
    InvalidPrice(Money),

    /// Crediting the payee would overflow its balance.
    #[error("Balance overflow while crediting payee")]
    BalanceOverflow,
}

impl SettlementRejection {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadySettled(_) => "ALREADY_SETTLED",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidPrice(_) => "INVALID_PRICE",
            Self::BalanceOverflow => "BALANCE_OVERFLOW",
        }
    }
}
