//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod deposit;
pub mod obligation;
pub mod relationship;
pub mod report;
pub mod settlement;

pub use account::{AccountRepository, CreateAccountInput};
pub use deposit::{DepositGuard, Deposited};
pub use obligation::{CreateObligationInput, ObligationRepository};
pub use relationship::{CreateRelationshipInput, RelationshipRepository};
pub use report::ReportRepository;
pub use settlement::{SettledObligation, SettlementEngine};

/// Fresh migrated in-memory database for the crate's own tests.
#[cfg(test)]
pub(crate) async fn test_db() -> sea_orm::DatabaseConnection {
    use crate::migration::{Migrator, MigratorTrait};
    use settle_shared::config::DatabaseConfig;

    let config = DatabaseConfig {
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::with_url("sqlite::memory:")
    };
    let db = crate::connect(&config).await.expect("Failed to open database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    db
}
