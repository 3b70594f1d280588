//! `SeaORM` Entity for the audit_log table (append-only).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AuditAction;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub entity_kind: String,
    pub entity_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub data_before: Option<Json>,
    pub data_after: Option<Json>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ActorId",
        to = "super::users::Column::Id",
        on_delete = "Restrict"
    )]
    Actor,
}

impl ActiveModelBehavior for ActiveModel {}
