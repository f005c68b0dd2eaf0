//! Account repository for party and balance records.
//!
//! Besides the public read/create API, this module owns the balance writes
//! used by the settlement engine and the deposit guard. Those helpers take
//! any `ConnectionTrait` so they run inside the caller's transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, sea_query::Expr,
};
use settle_shared::types::{AccountId, Money};

use crate::entities::{accounts, sea_orm_active_enums::AccountKind};
use crate::error::PaymentError;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Full display name.
    pub display_name: String,
    /// Classification label (e.g. profession).
    pub category: String,
    /// Usual contract side.
    pub kind: AccountKind,
    /// Starting balance in minor units.
    pub opening_balance: Money,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a negative opening balance or a blank name.
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, PaymentError> {
        if input.opening_balance.is_negative() {
            return Err(PaymentError::Validation(format!(
                "Opening balance cannot be negative, got {}",
                input.opening_balance
            )));
        }
        if input.display_name.trim().is_empty() {
            return Err(PaymentError::Validation(
                "Display name cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let account = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            display_name: Set(input.display_name),
            category: Set(input.category),
            kind: Set(input.kind),
            balance: Set(input.opening_balance.minor()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(account.insert(&self.db).await?)
    }

    /// Reads an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account does not exist.
    pub async fn read_account(&self, id: AccountId) -> Result<accounts::Model, PaymentError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| PaymentError::not_found("Account", id))
    }

    /// Reads an account and takes a row lock on it until the transaction ends.
    pub(crate) async fn lock<C>(conn: &C, id: AccountId) -> Result<Option<accounts::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        accounts::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(conn)
            .await
    }

    /// Locks two accounts, always in ascending ID order, and returns them in
    /// argument order.
    ///
    /// Two settlements running in opposite directions between the same pair
    /// would otherwise be able to deadlock.
    pub(crate) async fn lock_pair<C>(
        conn: &C,
        first: AccountId,
        second: AccountId,
    ) -> Result<(accounts::Model, accounts::Model), PaymentError>
    where
        C: ConnectionTrait,
    {
        let (low, high) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };

        let low_row = Self::lock(conn, low)
            .await?
            .ok_or_else(|| PaymentError::not_found("Account", low))?;
        let high_row = Self::lock(conn, high)
            .await?
            .ok_or_else(|| PaymentError::not_found("Account", high))?;

        if first <= second {
            Ok((low_row, high_row))
        } else {
            Ok((high_row, low_row))
        }
    }

    /// Decrements a balance only if it covers `amount`.
    ///
    /// Returns `false` when no row matched, i.e. the balance was too low.
    pub(crate) async fn debit_if_covered<C>(
        conn: &C,
        id: AccountId,
        amount: Money,
    ) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).sub(amount.minor()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id.into_inner()))
            .filter(accounts::Column::Balance.gte(amount.minor()))
            .exec(conn)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Increments a balance.
    ///
    /// Returns `false` when the account does not exist.
    pub(crate) async fn credit<C>(conn: &C, id: AccountId, amount: Money) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(amount.minor()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id.into_inner()))
            .exec(conn)
            .await?;

        Ok(result.rows_affected == 1)
    }
}
