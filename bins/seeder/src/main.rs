//! Demo data seeder for local development.
//!
//! Seeds a handful of payers, payees, relationships and obligations with
//! fixed IDs. Records that already exist are skipped, so running it twice is
//! harmless.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use settle_db::entities::{
    accounts, obligations, relationships,
    sea_orm_active_enums::{AccountKind, RelationshipStatus},
};
use settle_shared::AppConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// `(id, display name, category, kind, balance in minor units)`
const ACCOUNTS: &[(u128, &str, &str, AccountKind, i64)] = &[
    (0x11, "Harry Potter", "wizard", AccountKind::Payer, 115_000),
    (0x12, "Mr Robot", "hacker", AccountKind::Payer, 23_104),
    (0x13, "John Snow", "knows nothing", AccountKind::Payer, 45_100),
    (0x14, "Ash Ketchum", "pokemon master", AccountKind::Payer, 125),
    (0x21, "John Lennon", "musician", AccountKind::Payee, 6_400),
    (0x22, "Linus Torvalds", "programmer", AccountKind::Payee, 121_400),
    (0x23, "Alan Turing", "programmer", AccountKind::Payee, 2_200),
    (0x24, "Aragorn II Elessar", "fighter", AccountKind::Payee, 31_400),
];

/// `(id, payer, payee, status)`
const RELATIONSHIPS: &[(u128, u128, u128, RelationshipStatus)] = &[
    (0x101, 0x11, 0x21, RelationshipStatus::Terminated),
    (0x102, 0x11, 0x22, RelationshipStatus::Active),
    (0x103, 0x12, 0x23, RelationshipStatus::Active),
    (0x104, 0x12, 0x22, RelationshipStatus::Active),
    (0x105, 0x13, 0x24, RelationshipStatus::Active),
    (0x106, 0x13, 0x22, RelationshipStatus::Completed),
    (0x107, 0x14, 0x23, RelationshipStatus::Active),
];

/// `(id, relationship, description, price, paid days ago)`
const OBLIGATIONS: &[(u128, u128, &str, i64, Option<i64>)] = &[
    (0x1001, 0x101, "fence repair", 20_000, None),
    (0x1002, 0x102, "website refresh", 20_100, None),
    (0x1003, 0x103, "security audit", 20_200, None),
    (0x1004, 0x104, "kernel patch", 20_000, None),
    (0x1005, 0x107, "gym training plan", 20_000, None),
    (0x1006, 0x107, "server setup", 2_020, Some(9)),
    (0x1007, 0x102, "code review", 20_000, Some(5)),
    (0x1008, 0x103, "penetration test", 20_000, Some(5)),
    (0x1009, 0x105, "sword lessons", 12_100, Some(3)),
    (0x1010, 0x106, "driver port", 20_000, Some(2)),
    (0x1011, 0x105, "map reading", 12_100, Some(1)),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "settle_db=info,seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = settle_db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    info!("Seeding accounts...");
    seed_accounts(&db).await?;

    info!("Seeding relationships...");
    seed_relationships(&db).await?;

    info!("Seeding obligations...");
    seed_obligations(&db).await?;

    info!("Seeding complete!");
    Ok(())
}

async fn seed_accounts(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();

    for &(id, name, category, kind, balance) in ACCOUNTS {
        let id = Uuid::from_u128(id);
        if accounts::Entity::find_by_id(id).one(db).await?.is_some() {
            info!(%id, name, "Account already exists, skipping");
            continue;
        }

        accounts::ActiveModel {
            id: Set(id),
            display_name: Set(name.to_string()),
            category: Set(category.to_string()),
            kind: Set(kind),
            balance: Set(balance),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .with_context(|| format!("Failed to insert account {name}"))?;
        info!(%id, name, "Created account");
    }

    Ok(())
}

async fn seed_relationships(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();

    for &(id, payer, payee, status) in RELATIONSHIPS {
        let id = Uuid::from_u128(id);
        if relationships::Entity::find_by_id(id).one(db).await?.is_some() {
            info!(%id, "Relationship already exists, skipping");
            continue;
        }

        relationships::ActiveModel {
            id: Set(id),
            payer_account_id: Set(Uuid::from_u128(payer)),
            payee_account_id: Set(Uuid::from_u128(payee)),
            status: Set(status),
            terms: Set("bla bla bla".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .with_context(|| format!("Failed to insert relationship {id}"))?;
        info!(%id, ?status, "Created relationship");
    }

    Ok(())
}

async fn seed_obligations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();

    for &(id, relationship, description, price, paid_days_ago) in OBLIGATIONS {
        let id = Uuid::from_u128(id);
        if obligations::Entity::find_by_id(id).one(db).await?.is_some() {
            info!(%id, "Obligation already exists, skipping");
            continue;
        }

        let payment_date = paid_days_ago.map(|days| now - Duration::days(days));
        obligations::ActiveModel {
            id: Set(id),
            relationship_id: Set(Uuid::from_u128(relationship)),
            description: Set(description.to_string()),
            price: Set(price),
            paid: Set(payment_date.is_some()),
            payment_date: Set(payment_date),
            created_at: Set(payment_date.unwrap_or(now)),
        }
        .insert(db)
        .await
        .with_context(|| format!("Failed to insert obligation {id}"))?;
        info!(%id, price, paid = payment_date.is_some(), "Created obligation");
    }

    Ok(())
}
