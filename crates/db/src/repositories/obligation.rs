//! Obligation repository for billable units of work.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, sea_query::Expr,
};
use settle_shared::types::{AccountId, Money, ObligationId, RelationshipId};

use super::relationship::party_condition;
use crate::entities::{obligations, relationships};
use crate::error::PaymentError;

/// Input for creating an obligation.
#[derive(Debug, Clone)]
pub struct CreateObligationInput {
    /// Relationship the work belongs to.
    pub relationship_id: RelationshipId,
    /// What the work is.
    pub description: String,
    /// Price in minor units.
    pub price: Money,
}

/// Obligation repository.
#[derive(Debug, Clone)]
pub struct ObligationRepository {
    db: DatabaseConnection,
}

impl ObligationRepository {
    /// Creates a new obligation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an unpaid obligation on an existing relationship.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive price and `NotFound` if the
    /// relationship does not exist.
    pub async fn create_obligation(
        &self,
        input: CreateObligationInput,
    ) -> Result<obligations::Model, PaymentError> {
        if !input.price.is_positive() {
            return Err(PaymentError::Validation(format!(
                "Price must be positive, got {}",
                input.price
            )));
        }

        if relationships::Entity::find_by_id(input.relationship_id.into_inner())
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(PaymentError::not_found("Relationship", input.relationship_id));
        }

        let obligation = obligations::ActiveModel {
            id: Set(ObligationId::new().into_inner()),
            relationship_id: Set(input.relationship_id.into_inner()),
            description: Set(input.description),
            price: Set(input.price.minor()),
            paid: Set(false),
            payment_date: Set(None),
            created_at: Set(Utc::now()),
        };

        Ok(obligation.insert(&self.db).await?)
    }

    /// Reads an obligation by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the obligation does not exist.
    pub async fn read_obligation(
        &self,
        id: ObligationId,
    ) -> Result<obligations::Model, PaymentError> {
        obligations::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| PaymentError::not_found("Obligation", id))
    }

    /// Lists unpaid obligations on relationships the account is a party to,
    /// oldest first, whatever the relationship status.
    pub async fn list_unpaid_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<obligations::Model>, PaymentError> {
        Ok(obligations::Entity::find()
            .join(JoinType::InnerJoin, obligations::Relation::Relationships.def())
            .filter(party_condition(account_id))
            .filter(obligations::Column::Paid.eq(false))
            .order_by_asc(obligations::Column::CreatedAt)
            .order_by_asc(obligations::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Reads an obligation and takes a row lock on it until the transaction ends.
    pub(crate) async fn lock<C>(
        conn: &C,
        id: ObligationId,
    ) -> Result<Option<obligations::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        obligations::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(conn)
            .await
    }

    /// Flips `paid` and stamps `payment_date`, only if still unpaid.
    ///
    /// Returns `false` when another writer got there first.
    pub(crate) async fn mark_paid_if_unpaid<C>(
        conn: &C,
        id: ObligationId,
        at: DateTime<Utc>,
    ) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = obligations::Entity::update_many()
            .col_expr(obligations::Column::Paid, Expr::value(true))
            .col_expr(obligations::Column::PaymentDate, Expr::value(Some(at)))
            .filter(obligations::Column::Id.eq(id.into_inner()))
            .filter(obligations::Column::Paid.eq(false))
            .exec(conn)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Prices of every unpaid obligation where `payer` is the paying party,
    /// whatever the relationship status.
    pub(crate) async fn outstanding_prices_for_payer<C>(
        conn: &C,
        payer: AccountId,
    ) -> Result<Vec<Money>, DbErr>
    where
        C: ConnectionTrait,
    {
        let prices: Vec<i64> = obligations::Entity::find()
            .select_only()
            .column(obligations::Column::Price)
            .join(JoinType::InnerJoin, obligations::Relation::Relationships.def())
            .filter(relationships::Column::PayerAccountId.eq(payer.into_inner()))
            .filter(obligations::Column::Paid.eq(false))
            .into_tuple()
            .all(conn)
            .await?;

        Ok(prices.into_iter().map(Money::from_minor).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::entities::sea_orm_active_enums::{AccountKind, RelationshipStatus};
    use crate::repositories::{
        AccountRepository, CreateAccountInput, CreateRelationshipInput, RelationshipRepository,
        test_db,
    };

    async fn open_obligation(db: &DatabaseConnection, price: i64) -> (AccountId, ObligationId) {
        let accounts = AccountRepository::new(db.clone());
        let mut ids = Vec::new();
        for (name, kind) in [("Harry Potter", AccountKind::Payer), ("Bob", AccountKind::Payee)] {
            let model = accounts
                .create_account(CreateAccountInput {
                    display_name: name.to_string(),
                    category: "carpenter".to_string(),
                    kind,
                    opening_balance: Money::ZERO,
                })
                .await
                .unwrap();
            ids.push(AccountId::from_uuid(model.id));
        }

        let rel = RelationshipRepository::new(db.clone())
            .create(CreateRelationshipInput {
                payer_account_id: ids[0],
                payee_account_id: ids[1],
                terms: String::new(),
                status: RelationshipStatus::Active,
            })
            .await
            .unwrap();

        let job = ObligationRepository::new(db.clone())
            .create_obligation(CreateObligationInput {
                relationship_id: RelationshipId::from_uuid(rel.id),
                description: "shelves".to_string(),
                price: Money::from_minor(price),
            })
            .await
            .unwrap();

        (ids[0], ObligationId::from_uuid(job.id))
    }

    #[tokio::test]
    async fn test_mark_paid_only_once() {
        let db = test_db().await;
        let (_, job) = open_obligation(&db, 150).await;
        let first_at = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let second_at = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();

        assert!(ObligationRepository::mark_paid_if_unpaid(&db, job, first_at).await.unwrap());
        assert!(!ObligationRepository::mark_paid_if_unpaid(&db, job, second_at).await.unwrap());

        let stored = ObligationRepository::new(db.clone())
            .read_obligation(job)
            .await
            .unwrap();
        assert!(stored.paid);
        assert_eq!(stored.payment_date, Some(first_at));
    }

    #[tokio::test]
    async fn test_outstanding_prices_drop_paid_obligations() {
        let db = test_db().await;
        let (harry, job) = open_obligation(&db, 150).await;

        let before = ObligationRepository::outstanding_prices_for_payer(&db, harry)
            .await
            .unwrap();
        assert_eq!(before, [Money::from_minor(150)]);

        ObligationRepository::mark_paid_if_unpaid(&db, job, Utc::now())
            .await
            .unwrap();
        let after = ObligationRepository::outstanding_prices_for_payer(&db, harry)
            .await
            .unwrap();
        assert!(after.is_empty());
    }
}
