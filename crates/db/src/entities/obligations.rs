//! `SeaORM` Entity for obligations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "obligations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub relationship_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Price in minor units, always positive.
    pub price: i64,
    pub paid: bool,
    /// Set exactly when `paid` flips to true.
    pub payment_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::relationships::Entity",
        from = "Column::RelationshipId",
        to = "super::relationships::Column::Id"
    )]
    Relationships,
}

impl Related<super::relationships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Relationships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
