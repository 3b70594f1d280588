//! `SeaORM` Entity for the cash_balance_snapshots table (append-only).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CashMovementKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_balance_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance_before: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance_after: Decimal,
    pub cause: CashMovementKind,
    pub cash_movement_id: Uuid,
    pub operator_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_accounts::Entity",
        from = "Column::AccountId",
        to = "super::financial_accounts::Column::Id",
        on_delete = "Restrict"
    )]
    FinancialAccounts,
    #[sea_orm(
        belongs_to = "super::cash_movements::Entity",
        from = "Column::CashMovementId",
        to = "super::cash_movements::Column::Id",
        on_delete = "Restrict"
    )]
    CashMovements,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OperatorId",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Operator,
}

impl ActiveModelBehavior for ActiveModel {}
