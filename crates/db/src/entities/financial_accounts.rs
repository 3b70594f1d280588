//! `SeaORM` Entity for the financial_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountCategory, AccountKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub kind: AccountKind,
    pub category: AccountCategory,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance: Decimal,
    pub taxable: bool,
    pub description: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cash_movements::Entity")]
    CashMovements,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Creator,
}

impl Related<super::cash_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this is a physical cash account.
    #[must_use]
    pub fn is_cash(&self) -> bool {
        self.kind == AccountKind::Cash
    }
}
