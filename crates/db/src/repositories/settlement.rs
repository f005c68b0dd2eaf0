//! Settlement engine: pays an obligation from payer to payee.
//!
//! Every settlement runs in one transaction. The obligation row is locked
//! first, then both accounts in ascending ID order. The writes are guarded by
//! `WHERE paid = false` and `WHERE balance >= price`, so a racing writer that
//! slipped past the locks still cannot pay twice or overdraw.

use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use settle_core::settlement::{self, ObligationState};
use settle_shared::types::{AccountId, Money, ObligationId, RelationshipId};
use tracing::{info, warn};

use super::account::AccountRepository;
use super::obligation::ObligationRepository;
use super::relationship::RelationshipRepository;
use crate::entities::obligations;
use crate::error::PaymentError;

/// Outcome of a successful settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledObligation {
    /// The obligation after it was marked paid.
    pub obligation: obligations::Model,
    /// Payer balance after the transfer.
    pub payer_balance: Money,
    /// Payee balance after the transfer.
    pub payee_balance: Money,
}

/// Pays obligations atomically.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    db: DatabaseConnection,
}

impl SettlementEngine {
    /// Creates a new settlement engine.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Pays `obligation_id` on behalf of `acting_account_id`.
    ///
    /// Only the payer of the obligation's relationship may settle it; anyone
    /// else gets `NotFound`, the same as for a missing obligation.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the obligation is absent or not payable by the caller
    /// - `AlreadySettled` if it was paid before
    /// - `InsufficientFunds` if the payer balance is below the price
    /// - `StoreFailure` on any database error; nothing is written
    pub async fn settle_obligation(
        &self,
        obligation_id: ObligationId,
        acting_account_id: AccountId,
    ) -> Result<SettledObligation, PaymentError> {
        let txn = self.db.begin().await?;

        let obligation = ObligationRepository::lock(&txn, obligation_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Obligation", obligation_id))?;

        let relationship =
            RelationshipRepository::find(&txn, RelationshipId::from_uuid(obligation.relationship_id))
                .await?
                .filter(|r| r.payer_account_id == acting_account_id.into_inner())
                .ok_or_else(|| PaymentError::not_found("Obligation", obligation_id))?;

        let payer_id = acting_account_id;
        let payee_id = AccountId::from_uuid(relationship.payee_account_id);
        let (payer, payee) = AccountRepository::lock_pair(&txn, payer_id, payee_id).await?;

        let state = ObligationState {
            id: obligation_id,
            price: Money::from_minor(obligation.price),
            paid: obligation.paid,
        };
        settlement::check_settleable(&state, Money::from_minor(payer.balance))?;
        let transfer = settlement::transfer(
            Money::from_minor(payer.balance),
            Money::from_minor(payee.balance),
            state.price,
        )?;

        if !ObligationRepository::mark_paid_if_unpaid(&txn, obligation_id, Utc::now()).await? {
            warn!(obligation_id = %obligation_id, "Obligation paid by a concurrent settlement");
            return Err(PaymentError::AlreadySettled(obligation_id.into_inner()));
        }

        if !AccountRepository::debit_if_covered(&txn, payer_id, transfer.amount).await? {
            warn!(account_id = %payer_id, "Payer balance dropped below price during settlement");
            return Err(PaymentError::InsufficientFunds {
                available: transfer.payer_before,
                required: transfer.amount,
            });
        }

        if !AccountRepository::credit(&txn, payee_id, transfer.amount).await? {
            return Err(PaymentError::not_found("Account", payee_id));
        }

        let obligation = obligations::Entity::find_by_id(obligation_id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| PaymentError::not_found("Obligation", obligation_id))?;

        txn.commit().await?;

        info!(
            obligation_id = %obligation_id,
            payer_id = %payer_id,
            payee_id = %payee_id,
            amount = %transfer.amount,
            "Obligation settled"
        );

        Ok(SettledObligation {
            obligation,
            payer_balance: transfer.payer_after,
            payee_balance: transfer.payee_after,
        })
    }
}
