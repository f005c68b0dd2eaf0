//! String-backed enums stored in entity columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which side of contracts an account usually stands on.
///
/// Informational only: who pays is always decided by the relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Hires and pays for work.
    #[sea_orm(string_value = "payer")]
    Payer,
    /// Performs work and gets paid.
    #[sea_orm(string_value = "payee")]
    Payee,
}

/// Lifecycle state of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// Work is ongoing.
    #[sea_orm(string_value = "active")]
    Active,
    /// Work finished normally.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Contract ended early.
    #[sea_orm(string_value = "terminated")]
    Terminated,
}
