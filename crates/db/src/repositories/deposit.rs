//! Deposit guard: credits a balance, capped by outstanding obligations.

use sea_orm::{DatabaseConnection, TransactionTrait};
use settle_core::deposit::DepositPolicy;
use settle_shared::config::DepositConfig;
use settle_shared::types::{AccountId, Money};
use tracing::info;

use super::account::AccountRepository;
use super::obligation::ObligationRepository;
use crate::error::PaymentError;

/// Outcome of an accepted deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deposited {
    /// Credited account.
    pub account_id: AccountId,
    /// Amount credited.
    pub amount: Money,
    /// Balance after the credit.
    pub new_balance: Money,
    /// Largest deposit that would have been accepted.
    pub cap: Money,
    /// Outstanding unpaid total the cap was derived from.
    pub outstanding: Money,
}

/// Accepts or rejects deposits against the account's outstanding obligations.
#[derive(Debug, Clone)]
pub struct DepositGuard {
    db: DatabaseConnection,
    policy: DepositPolicy,
}

impl DepositGuard {
    /// Creates a guard with the default cap.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_policy(db, DepositPolicy::default())
    }

    /// Creates a guard with an explicit policy.
    #[must_use]
    pub const fn with_policy(db: DatabaseConnection, policy: DepositPolicy) -> Self {
        Self { db, policy }
    }

    /// Creates a guard from configuration.
    #[must_use]
    pub fn from_config(db: DatabaseConnection, config: DepositConfig) -> Self {
        Self::with_policy(db, DepositPolicy::from(config))
    }

    /// Credits `amount` to `account_id` if it is within the cap.
    ///
    /// The outstanding total covers unpaid obligations on every relationship
    /// where the account is payer, terminated ones included. The account row
    /// stays locked until commit, so a concurrent settlement by the same
    /// payer cannot change the total mid-check.
    ///
    /// # Errors
    ///
    /// - `Validation` if `amount` is not positive or the balance would overflow
    /// - `NotFound` if the account does not exist
    /// - `DepositCapExceeded` if `amount` is above the cap
    /// - `StoreFailure` on any database error
    pub async fn authorize_deposit(
        &self,
        account_id: AccountId,
        amount: Money,
    ) -> Result<Deposited, PaymentError> {
        if !amount.is_positive() {
            return Err(PaymentError::Validation(format!(
                "Deposit amount must be positive, got {amount}"
            )));
        }

        let txn = self.db.begin().await?;

        let account = AccountRepository::lock(&txn, account_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Account", account_id))?;

        let prices = ObligationRepository::outstanding_prices_for_payer(&txn, account_id).await?;
        let outstanding = DepositPolicy::outstanding_total(prices)?;
        let cap = self.policy.cap(outstanding);

        self.policy.authorize(amount, outstanding)?;
        let new_balance = DepositPolicy::credit(Money::from_minor(account.balance), amount)?;

        if !AccountRepository::credit(&txn, account_id, amount).await? {
            return Err(PaymentError::not_found("Account", account_id));
        }

        txn.commit().await?;

        info!(
            account_id = %account_id,
            amount = %amount,
            cap = %cap,
            outstanding = %outstanding,
            "Deposit accepted"
        );

        Ok(Deposited {
            account_id,
            amount,
            new_balance,
            cap,
            outstanding,
        })
    }
}
