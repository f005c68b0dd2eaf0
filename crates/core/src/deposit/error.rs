//! Deposit rejection types.

use settle_shared::types::Money;
use thiserror::Error;

/// Reasons a deposit is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepositRejection {
    /// Deposit amount must be strictly positive.
    #[error("Deposit amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    /// Deposit is larger than the cap derived from outstanding obligations.
    #[error("Can't deposit {requested}: limit is {cap} ({outstanding} outstanding)")]
    CapExceeded {
        /// Largest amount that would have been accepted.
        cap: Money,
        /// Amount the caller asked to deposit.
        requested: Money,
        /// Sum of unpaid obligation prices the cap was derived from.
        outstanding: Money,
    },

    /// Summing or crediting overflowed.
    #[error("Amount overflow")]
    Overflow,
}

impl DepositRejection {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::CapExceeded { .. } => "DEPOSIT_CAP_EXCEEDED",
            Self::Overflow => "AMOUNT_OVERFLOW",
        }
    }
}
