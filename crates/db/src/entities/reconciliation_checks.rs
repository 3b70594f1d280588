//! `SeaORM` Entity for the reconciliation_checks table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountCategory, CheckState};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reconciliation_checks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub category: Option<AccountCategory>,
    pub period_start: DateTimeWithTimeZone,
    pub period_end: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub opening_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub closing_real: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub closing_calculated: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub difference: Decimal,
    pub state: CheckState,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_in: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_out: Decimal,
    pub movement_count: i64,
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
        belongs_to = "super::users::Entity",
        from = "Column::OperatorId",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Operator,
}

impl ActiveModelBehavior for ActiveModel {}
