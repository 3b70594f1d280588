//! Shared store schema: identity records, tenant descriptors, user profiles.

use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entities::{tenants, user_profiles, users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        for mut table in [
            schema.create_table_from_entity(users::Entity),
            schema.create_table_from_entity(tenants::Entity),
            schema.create_table_from_entity(user_profiles::Entity),
        ] {
            manager.create_table(table.if_not_exists().to_owned()).await?;
        }

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_profiles_tenant")
                    .table(user_profiles::Entity)
                    .col(user_profiles::Column::TenantId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(user_profiles::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(tenants::Entity).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(users::Entity).if_exists().to_owned())
            .await
    }
}
