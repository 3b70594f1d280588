//! Tenant store schema: identity mirror plus every ledger table.

use sea_orm::{ConnectionTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entities::{
    account_transfers, audit_log, balance_snapshots, cash_balance_snapshots, cash_movements,
    cash_sessions, customers, financial_accounts, movements, reconciliation_checks, users,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Creation order follows the foreign keys.
        for mut table in [
            schema.create_table_from_entity(users::Entity),
            schema.create_table_from_entity(customers::Entity),
            schema.create_table_from_entity(cash_sessions::Entity),
            schema.create_table_from_entity(movements::Entity),
            schema.create_table_from_entity(financial_accounts::Entity),
            schema.create_table_from_entity(account_transfers::Entity),
            schema.create_table_from_entity(cash_movements::Entity),
            schema.create_table_from_entity(cash_balance_snapshots::Entity),
            schema.create_table_from_entity(reconciliation_checks::Entity),
            schema.create_table_from_entity(balance_snapshots::Entity),
            schema.create_table_from_entity(audit_log::Entity),
        ] {
            manager.create_table(table.if_not_exists().to_owned()).await?;
        }

        for index in [
            Index::create()
                .if_not_exists()
                .name("idx_movements_customer_settled")
                .table(movements::Entity)
                .col(movements::Column::CustomerId)
                .col(movements::Column::Settled)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_movements_session")
                .table(movements::Entity)
                .col(movements::Column::SessionId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_cash_movements_account_created")
                .table(cash_movements::Entity)
                .col(cash_movements::Column::AccountId)
                .col(cash_movements::Column::CreatedAt)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_audit_log_entity")
                .table(audit_log::Entity)
                .col(audit_log::Column::EntityKind)
                .col(audit_log::Column::EntityId)
                .to_owned(),
        ] {
            manager.create_index(index).await?;
        }

        // At most one open session per operator. Partial indexes exist on Postgres and SQLite.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_cash_sessions_one_open \
                 ON cash_sessions (operator_id) WHERE state = 'open'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            audit_log::Entity.into_table_ref(),
            balance_snapshots::Entity.into_table_ref(),
            reconciliation_checks::Entity.into_table_ref(),
            cash_balance_snapshots::Entity.into_table_ref(),
            cash_movements::Entity.into_table_ref(),
            account_transfers::Entity.into_table_ref(),
            financial_accounts::Entity.into_table_ref(),
            movements::Entity.into_table_ref(),
            cash_sessions::Entity.into_table_ref(),
            customers::Entity.into_table_ref(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        // On the shared store `users` belongs to the shared schema.
        if manager.has_table("user_profiles").await? {
            return Ok(());
        }
        manager
            .drop_table(Table::drop().table(users::Entity).if_exists().to_owned())
            .await
    }
}
