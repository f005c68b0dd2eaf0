//! `SeaORM` entity definitions.

pub mod accounts;
pub mod obligations;
pub mod relationships;
pub mod sea_orm_active_enums;
