//! `SeaORM` Entity for the movements table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MovementKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub kind: MovementKind,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    pub occurred_at: DateTimeWithTimeZone,
    pub settled: bool,
    pub session_id: Option<Uuid>,
    pub origin_movement_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub modified_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_delete = "Restrict"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::cash_sessions::Entity",
        from = "Column::SessionId",
        to = "super::cash_sessions::Column::Id",
        on_delete = "Restrict"
    )]
    CashSessions,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::OriginMovementId",
        to = "Column::Id",
        on_delete = "Restrict"
    )]
    OriginMovement,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ModifiedBy",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
    )]
    Modifier,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::cash_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
