//! Shared fixtures for the database integration tests.
//!
//! Most tests get their own in-memory SQLite database. That pool holds
//! exactly one connection because each SQLite memory connection is a
//! separate database. `pooled_setup` opens a file-backed database instead so
//! transactions can really overlap.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use settle_db::entities::obligations;
use settle_db::entities::sea_orm_active_enums::{AccountKind, RelationshipStatus};
use settle_db::migration::{Migrator, MigratorTrait};
use settle_db::repositories::{
    AccountRepository, CreateAccountInput, CreateObligationInput, CreateRelationshipInput,
    ObligationRepository, RelationshipRepository,
};
use settle_shared::config::DatabaseConfig;
use settle_shared::types::{AccountId, Money, ObligationId, RelationshipId};
use tempfile::TempDir;

/// Connects to a fresh, migrated in-memory database.
pub async fn setup() -> DatabaseConnection {
    let config = DatabaseConfig {
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::with_url("sqlite::memory:")
    };
    migrated(&config).await
}

/// Connects to a fresh, migrated SQLite file with `connections` pooled
/// connections. The database lives as long as the returned directory.
pub async fn pooled_setup(connections: u32) -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("settle.db");
    let config = DatabaseConfig {
        max_connections: connections,
        min_connections: connections,
        ..DatabaseConfig::with_url(format!("sqlite://{}?mode=rwc", path.display()))
    };
    let db = migrated(&config).await;
    (dir, db)
}

async fn migrated(config: &DatabaseConfig) -> DatabaseConnection {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let db = settle_db::connect(config)
        .await
        .expect("Failed to open database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Noon UTC on the given day of 2024.
pub fn at(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
}

pub async fn payer(db: &DatabaseConnection, name: &str, balance: i64) -> AccountId {
    account(db, name, "client", AccountKind::Payer, balance).await
}

pub async fn payee(db: &DatabaseConnection, name: &str, category: &str) -> AccountId {
    account(db, name, category, AccountKind::Payee, 0).await
}

pub async fn account(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
    kind: AccountKind,
    balance: i64,
) -> AccountId {
    let model = AccountRepository::new(db.clone())
        .create_account(CreateAccountInput {
            display_name: name.to_string(),
            category: category.to_string(),
            kind,
            opening_balance: Money::from_minor(balance),
        })
        .await
        .expect("Failed to create account");
    AccountId::from_uuid(model.id)
}

pub async fn relationship(
    db: &DatabaseConnection,
    payer: AccountId,
    payee: AccountId,
    status: RelationshipStatus,
) -> RelationshipId {
    let model = RelationshipRepository::new(db.clone())
        .create(CreateRelationshipInput {
            payer_account_id: payer,
            payee_account_id: payee,
            terms: "standard terms".to_string(),
            status,
        })
        .await
        .expect("Failed to create relationship");
    RelationshipId::from_uuid(model.id)
}

pub async fn obligation(
    db: &DatabaseConnection,
    relationship: RelationshipId,
    price: i64,
) -> ObligationId {
    let model = ObligationRepository::new(db.clone())
        .create_obligation(CreateObligationInput {
            relationship_id: relationship,
            description: "work".to_string(),
            price: Money::from_minor(price),
        })
        .await
        .expect("Failed to create obligation");
    ObligationId::from_uuid(model.id)
}

/// Inserts an obligation that was already paid at `paid_at`.
pub async fn paid_obligation(
    db: &DatabaseConnection,
    relationship: RelationshipId,
    price: i64,
    paid_at: DateTime<Utc>,
) -> ObligationId {
    let id = ObligationId::new();
    obligations::ActiveModel {
        id: Set(id.into_inner()),
        relationship_id: Set(relationship.into_inner()),
        description: Set("finished work".to_string()),
        price: Set(price),
        paid: Set(true),
        payment_date: Set(Some(paid_at)),
        created_at: Set(paid_at),
    }
    .insert(db)
    .await
    .expect("Failed to insert paid obligation");
    id
}

pub async fn balance(db: &DatabaseConnection, id: AccountId) -> Money {
    let account = AccountRepository::new(db.clone())
        .read_account(id)
        .await
        .expect("Failed to read account");
    Money::from_minor(account.balance)
}
