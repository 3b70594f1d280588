//! Tenant store: customer notices.

use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entities::notices;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager
            .create_table(
                schema
                    .create_table_from_entity(notices::Entity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notices_customer_created")
                    .table(notices::Entity)
                    .col(notices::Column::CustomerId)
                    .col(notices::Column::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(notices::Entity).if_exists().to_owned())
            .await
    }
}
