//! Settlement preconditions and transfer arithmetic.

use serde::{Deserialize, Serialize};
use settle_shared::types::{Money, ObligationId};

use super::error::SettlementRejection;

/// The parts of an obligation the settlement rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObligationState {
    /// Obligation ID.
    pub id: ObligationId,
    /// Price in minor units.
    pub price: Money,
    /// Whether the obligation has been paid.
    pub paid: bool,
}

/// Balances of both parties before and after a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Amount moved from payer to payee.
    pub amount: Money,
    /// Payer balance before the transfer.
    pub payer_before: Money,
    /// Payer balance after the transfer.
    pub payer_after: Money,
    /// Payee balance before the transfer.
    pub payee_before: Money,
    /// Payee balance after the transfer.
    pub payee_after: Money,
}

/// Checks whether `obligation` can be paid from `payer_balance`.
///
/// Checks run in a fixed order: price sanity, then the paid flag, then funds.
/// A paid obligation is reported as `AlreadySettled` even if the payer is
/// broke, so repeated calls always give the same answer.
///
/// # Errors
///
/// Returns the first rule the obligation violates.
pub fn check_settleable(
    obligation: &ObligationState,
    payer_balance: Money,
) -> Result<(), SettlementRejection> {
    if !obligation.price.is_positive() {
        return Err(SettlementRejection::InvalidPrice(obligation.price));
    }

    if obligation.paid {
        return Err(SettlementRejection::AlreadySettled(obligation.id));
    }

    if payer_balance < obligation.price {
        return Err(SettlementRejection::InsufficientFunds {
            available: payer_balance,
            required: obligation.price,
        });
    }

    Ok(())
}

/// Computes the balances after moving `amount` from payer to payee.
///
/// # Errors
///
/// Returns `InsufficientFunds` if the payer would go negative and
/// `BalanceOverflow` if the payee balance cannot hold the credit.
pub fn transfer(
    payer_balance: Money,
    payee_balance: Money,
    amount: Money,
) -> Result<Transfer, SettlementRejection> {
    if !amount.is_positive() {
        return Err(SettlementRejection::InvalidPrice(amount));
    }

    let payer_after = payer_balance
        .checked_sub(amount)
        .filter(|balance| !balance.is_negative())
        .ok_or(SettlementRejection::InsufficientFunds {
            available: payer_balance,
            required: amount,
        })?;

    let payee_after = payee_balance
        .checked_add(amount)
        .ok_or(SettlementRejection::BalanceOverflow)?;

    Ok(Transfer {
        amount,
        payer_before: payer_balance,
        payer_after,
        payee_before: payee_balance,
        payee_after,
    })
}
