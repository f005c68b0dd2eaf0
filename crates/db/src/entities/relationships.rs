//! `SeaORM` Entity for relationships table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RelationshipStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "relationships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payer_account_id: Uuid,
    pub payee_account_id: Uuid,
    pub status: RelationshipStatus,
    #[sea_orm(column_type = "Text")]
    pub terms: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::PayerAccountId",
        to = "super::accounts::Column::Id"
    )]
    Payer,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::PayeeAccountId",
        to = "super::accounts::Column::Id"
    )]
    Payee,
    #[sea_orm(has_many = "super::obligations::Entity")]
    Obligations,
}

impl Related<super::obligations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
