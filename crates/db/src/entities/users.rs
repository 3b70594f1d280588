//! `SeaORM` Entity for the users table.
//!
//! The shared store owns these rows; tenant stores hold read-only mirrors with the same id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::UserRole;
use distinta_core::tenancy::Principal;
use distinta_shared::types::UserId;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The principal this identity acts as.
    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: UserId::from_uuid(self.id),
            role: self.role.into(),
            is_superuser: self.is_superuser,
        }
    }
}
