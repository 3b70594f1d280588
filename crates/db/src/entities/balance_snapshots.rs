//! `SeaORM` Entity for the balance_snapshots table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LiquidityTrend;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "balance_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub taken_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub cash: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub bank: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub online: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub customers: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub agents: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub expenses: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub revenue: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub owner_withdrawals: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub owner_deposits: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_liquidity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_assets: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_liabilities: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub net_position: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub delta_previous: Decimal,
    pub trend: LiquidityTrend,
    pub operator_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OperatorId",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Operator,
}

impl ActiveModelBehavior for ActiveModel {}
