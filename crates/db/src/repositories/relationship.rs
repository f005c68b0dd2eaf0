//! Relationship repository for payer/payee contracts.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use settle_shared::types::{AccountId, RelationshipId};

use crate::entities::{accounts, relationships, sea_orm_active_enums::RelationshipStatus};
use crate::error::PaymentError;

/// Input for creating a relationship.
#[derive(Debug, Clone)]
pub struct CreateRelationshipInput {
    /// Account that pays obligations.
    pub payer_account_id: AccountId,
    /// Account that receives payments.
    pub payee_account_id: AccountId,
    /// Free-form terms.
    pub terms: String,
    /// Initial status.
    pub status: RelationshipStatus,
}

/// Relationship repository.
#[derive(Debug, Clone)]
pub struct RelationshipRepository {
    db: DatabaseConnection,
}

impl RelationshipRepository {
    /// Creates a new relationship repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a relationship between two existing accounts.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if payer and payee are the same account and
    /// `NotFound` if either account does not exist.
    pub async fn create(
        &self,
        input: CreateRelationshipInput,
    ) -> Result<relationships::Model, PaymentError> {
        if input.payer_account_id == input.payee_account_id {
            return Err(PaymentError::Validation(
                "Payer and payee must be different accounts".to_string(),
            ));
        }

        for id in [input.payer_account_id, input.payee_account_id] {
            if accounts::Entity::find_by_id(id.into_inner())
                .one(&self.db)
                .await?
                .is_none()
            {
                return Err(PaymentError::not_found("Account", id));
            }
        }

        let now = Utc::now();
        let relationship = relationships::ActiveModel {
            id: Set(RelationshipId::new().into_inner()),
            payer_account_id: Set(input.payer_account_id.into_inner()),
            payee_account_id: Set(input.payee_account_id.into_inner()),
            status: Set(input.status),
            terms: Set(input.terms),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(relationship.insert(&self.db).await?)
    }

    /// Gets a relationship the acting account is a party to.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the relationship does not exist or `account_id`
    /// is neither its payer nor its payee.
    pub async fn get_for_account(
        &self,
        id: RelationshipId,
        account_id: AccountId,
    ) -> Result<relationships::Model, PaymentError> {
        relationships::Entity::find_by_id(id.into_inner())
            .filter(party_condition(account_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| PaymentError::not_found("Relationship", id))
    }

    /// Lists non-terminated relationships of an account, oldest first.
    pub async fn list_open_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<relationships::Model>, PaymentError> {
        Ok(relationships::Entity::find()
            .filter(party_condition(account_id))
            .filter(relationships::Column::Status.ne(RelationshipStatus::Terminated))
            .order_by_asc(relationships::Column::CreatedAt)
            .order_by_asc(relationships::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Reads a relationship on the caller's connection.
    pub(crate) async fn find<C>(
        conn: &C,
        id: RelationshipId,
    ) -> Result<Option<relationships::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        relationships::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await
    }
}

/// Matches relationships where `account_id` is payer or payee.
pub(crate) fn party_condition(account_id: AccountId) -> Condition {
    let id = account_id.into_inner();
    Condition::any()
        .add(relationships::Column::PayerAccountId.eq(id))
        .add(relationships::Column::PayeeAccountId.eq(id))
}
