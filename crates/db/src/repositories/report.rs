//! Report repository for the aggregation reports over paid obligations.
//!
//! Rows are loaded inside one read-only transaction so both the obligation
//! set and the account data it refers to come from the same snapshot.
//! Summing and ranking happen in `settle_core::reports`.

use std::collections::HashMap;

use sea_orm::{
    AccessMode, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, IsolationLevel,
    QueryFilter, TransactionTrait,
};
use settle_core::reports::{
    AccountPayment, CategoryEarnings, DateRange, PaidObligation, ReportService, TopAccountsQuery,
};
use settle_shared::config::ReportConfig;
use settle_shared::types::{AccountId, Money, ObligationId};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{accounts, obligations, relationships};
use crate::error::PaymentError;

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    config: ReportConfig,
}

impl ReportRepository {
    /// Creates a new report repository with default settings.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, ReportConfig::default())
    }

    /// Creates a report repository with explicit settings.
    #[must_use]
    pub const fn with_config(db: DatabaseConnection, config: ReportConfig) -> Self {
        Self { db, config }
    }

    /// Builds a top-accounts query, using the configured default limit when
    /// `limit` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the effective limit is zero.
    pub fn top_accounts_query(
        &self,
        range: DateRange,
        limit: Option<u64>,
    ) -> Result<TopAccountsQuery, PaymentError> {
        Ok(TopAccountsQuery::with_default(
            range,
            limit,
            self.config.default_top_accounts_limit,
        )?)
    }

    /// Returns the payee category that earned the most in `range`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no obligation was paid in the window.
    pub async fn top_category_by_earnings(
        &self,
        range: DateRange,
    ) -> Result<CategoryEarnings, PaymentError> {
        let rows = self.load_paid(&range).await?;

        ReportService::top_category(&rows, &range)?
            .ok_or_else(|| PaymentError::NotFound("paid obligations in range".to_string()))
    }

    /// Returns the payer accounts that paid the most in the query window,
    /// highest first. An empty window gives an empty list.
    pub async fn top_accounts_by_payment(
        &self,
        query: TopAccountsQuery,
    ) -> Result<Vec<AccountPayment>, PaymentError> {
        let rows = self.load_paid(&query.range).await?;

        Ok(ReportService::top_accounts(&rows, &query.range, query.limit)?)
    }

    /// Loads paid obligations in `range` with their payer and payee data.
    async fn load_paid(&self, range: &DateRange) -> Result<Vec<PaidObligation>, PaymentError> {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            )
            .await?;

        let rows = Self::load_paid_in(&txn, range).await?;
        txn.commit().await?;

        debug!(
            start = %range.start(),
            end = %range.end(),
            rows = rows.len(),
            "Loaded paid obligations"
        );

        Ok(rows)
    }

    async fn load_paid_in(
        txn: &DatabaseTransaction,
        range: &DateRange,
    ) -> Result<Vec<PaidObligation>, PaymentError> {
        let paid = obligations::Entity::find()
            .filter(obligations::Column::Paid.eq(true))
            .filter(obligations::Column::PaymentDate.between(range.start(), range.end()))
            .all(txn)
            .await?;

        if paid.is_empty() {
            return Ok(Vec::new());
        }

        let relationship_ids: Vec<Uuid> = paid.iter().map(|o| o.relationship_id).collect();
        let relationship_by_id: HashMap<Uuid, relationships::Model> = relationships::Entity::find()
            .filter(relationships::Column::Id.is_in(relationship_ids))
            .all(txn)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let account_ids: Vec<Uuid> = relationship_by_id
            .values()
            .flat_map(|r| [r.payer_account_id, r.payee_account_id])
            .collect();
        let account_by_id: HashMap<Uuid, accounts::Model> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(txn)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut rows = Vec::with_capacity(paid.len());
        for obligation in paid {
            let Some(payment_date) = obligation.payment_date else {
                continue;
            };
            // Foreign keys guarantee these exist; a miss means a broken store.
            let relationship = relationship_by_id
                .get(&obligation.relationship_id)
                .ok_or_else(|| {
                    PaymentError::not_found("Relationship", obligation.relationship_id)
                })?;
            let payer = account_by_id
                .get(&relationship.payer_account_id)
                .ok_or_else(|| PaymentError::not_found("Account", relationship.payer_account_id))?;
            let payee = account_by_id
                .get(&relationship.payee_account_id)
                .ok_or_else(|| PaymentError::not_found("Account", relationship.payee_account_id))?;

            rows.push(PaidObligation {
                obligation_id: ObligationId::from_uuid(obligation.id),
                price: Money::from_minor(obligation.price),
                payment_date,
                payer_id: AccountId::from_uuid(payer.id),
                payer_name: payer.display_name.clone(),
                payee_category: payee.category.clone(),
            });
        }

        Ok(rows)
    }
}
