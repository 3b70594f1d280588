//! `SeaORM` Entity for the customers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RiskRating;
use distinta_core::movement::CreditView;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub credit_limit: Decimal,
    pub risk_rating: RiskRating,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub modified_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movements::Entity")]
    Movements,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_delete = "SetNull"
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

impl Related<super::movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// "Last First" as shown on statements.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }

    /// Derived credit figures for the cached balance.
    #[must_use]
    pub const fn credit_view(&self) -> CreditView {
        CreditView::new(self.balance, self.credit_limit)
    }
}
