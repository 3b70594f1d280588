//! `SeaORM` Entity for the cash_sessions table (the "distinta").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SessionState;
use distinta_core::drawer::SessionSnapshot;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub operator_id: Uuid,
    pub business_date: Date,
    pub start_time: DateTimeWithTimeZone,
    pub end_time: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub opening_cash: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub closing_cash: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_in: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_out: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_beverage_deduction: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub terminal_balance: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub cash_difference: Decimal,
    pub state: SessionState,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movements::Entity")]
    Movements,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OperatorId",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Operator,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::VerifiedBy",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Verifier,
}

impl Related<super::movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Key fields captured in audit snapshots.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            operator_id: self.operator_id,
            business_date: self.business_date,
            start_time: self.start_time,
            end_time: self.end_time,
            state: self.state.into(),
            opening_cash: self.opening_cash,
            closing_cash: self.closing_cash,
            total_in: self.total_in,
            total_out: self.total_out,
            total_beverage_deduction: self.total_beverage_deduction,
            terminal_balance: self.terminal_balance,
            cash_difference: self.cash_difference,
            verified_by: self.verified_by,
        }
    }
}
