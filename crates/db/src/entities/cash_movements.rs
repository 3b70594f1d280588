//! `SeaORM` Entity for the cash_movements table.
//!
//! One row per event that changes the agency cash balance. `amount` is the signed delta.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CashMovementKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: CashMovementKind,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance_before: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance_after: Decimal,
    pub session_id: Option<Uuid>,
    pub transfer_id: Option<Uuid>,
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
        belongs_to = "super::cash_sessions::Entity",
        from = "Column::SessionId",
        to = "super::cash_sessions::Column::Id",
        on_delete = "SetNull"
    )]
    CashSessions,
    #[sea_orm(
        belongs_to = "super::account_transfers::Entity",
        from = "Column::TransferId",
        to = "super::account_transfers::Column::Id",
        on_delete = "SetNull"
    )]
    AccountTransfers,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OperatorId",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Operator,
}

impl Related<super::financial_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
