//! `SeaORM` Entity for the account_transfers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransferKind;
use distinta_core::transfer::SidePlan;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account_transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: TransferKind,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub source_account_id: Option<Uuid>,
    pub destination_account_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub source_pre: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub source_post: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub destination_pre: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub destination_post: Option<Decimal>,
    pub operator_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::financial_accounts::Entity",
        from = "Column::SourceAccountId",
        to = "super::financial_accounts::Column::Id",
        on_delete = "Restrict"
    )]
    SourceAccount,
    #[sea_orm(
        belongs_to = "super::financial_accounts::Entity",
        from = "Column::DestinationAccountId",
        to = "super::financial_accounts::Column::Id",
        on_delete = "Restrict"
    )]
    DestinationAccount,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OperatorId",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Operator,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Recorded source side, when both values are present.
    #[must_use]
    pub fn source_side(&self) -> Option<SidePlan> {
        Some(SidePlan {
            pre: self.source_pre?,
            post: self.source_post?,
        })
    }

    /// Recorded destination side, when both values are present.
    #[must_use]
    pub fn destination_side(&self) -> Option<SidePlan> {
        Some(SidePlan {
            pre: self.destination_pre?,
            post: self.destination_post?,
        })
    }
}
