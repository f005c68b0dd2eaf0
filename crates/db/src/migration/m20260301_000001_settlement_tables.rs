//! Creates the accounts, relationships and obligations tables.
//!
//! Written with the schema builder (no raw SQL) so the same migration runs on
//! `PostgreSQL` in production and `SQLite` in the test suite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::DisplayName).string().not_null())
                    .col(ColumnDef::new(Accounts::Category).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Accounts::Balance).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Accounts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Relationships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Relationships::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Relationships::PayerAccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Relationships::PayeeAccountId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Relationships::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Relationships::Terms)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Relationships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Relationships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(
                        Expr::col(Relationships::PayerAccountId)
                            .ne(Expr::col(Relationships::PayeeAccountId)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_relationships_payer")
                            .from(Relationships::Table, Relationships::PayerAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_relationships_payee")
                            .from(Relationships::Table, Relationships::PayeeAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Obligations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Obligations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Obligations::RelationshipId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Obligations::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Obligations::Price)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Obligations::Price).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Obligations::Paid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Obligations::PaymentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Obligations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    // A payment date exists exactly when the obligation is paid
                    .check(
                        Expr::col(Obligations::Paid)
                            .eq(true)
                            .and(Expr::col(Obligations::PaymentDate).is_not_null())
                            .or(Expr::col(Obligations::Paid)
                                .eq(false)
                                .and(Expr::col(Obligations::PaymentDate).is_null())),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_obligations_relationship")
                            .from(Obligations::Table, Obligations::RelationshipId)
                            .to(Relationships::Table, Relationships::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Payer lookups drive both settlement authorization and the deposit cap sum
        manager
            .create_index(
                Index::create()
                    .name("idx_relationships_payer")
                    .table(Relationships::Table)
                    .col(Relationships::PayerAccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_relationships_payee")
                    .table(Relationships::Table)
                    .col(Relationships::PayeeAccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_obligations_relationship_paid")
                    .table(Obligations::Table)
                    .col(Obligations::RelationshipId)
                    .col(Obligations::Paid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_obligations_payment_date")
                    .table(Obligations::Table)
                    .col(Obligations::PaymentDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Obligations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Relationships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    DisplayName,
    Category,
    Kind,
    Balance,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Relationships {
    Table,
    Id,
    PayerAccountId,
    PayeeAccountId,
    Status,
    Terms,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Obligations {
    Table,
    Id,
    RelationshipId,
    Description,
    Price,
    Paid,
    PaymentDate,
    CreatedAt,
}
