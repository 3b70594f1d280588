//! Database migrations.
//!
//! The shared store and the tenant stores have separate migrators. Tenant tables are
//! generated from the entity definitions, so every tenant store gets the same schema.
//! The shared store also carries the ledger tables: principals without an active tenant
//! are routed there.

use sea_orm::DatabaseConnection;
pub use sea_orm_migration::prelude::*;

mod m20261019_000001_shared_schema;
mod m20261019_000002_tenant_schema;
mod m20261019_000003_notices;

/// Migrator for the shared store (identities, tenants, profiles).
pub struct SharedMigrator;

#[async_trait::async_trait]
impl MigratorTrait for SharedMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261019_000001_shared_schema::Migration)]
    }
}

/// Migrator applied identically to every tenant store.
pub struct TenantMigrator;

#[async_trait::async_trait]
impl MigratorTrait for TenantMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000002_tenant_schema::Migration),
            Box::new(m20261019_000003_notices::Migration),
        ]
    }

    // Kept apart from the shared history so both can target one database in development.
    fn migration_table_name() -> DynIden {
        Alias::new("seaql_migrations_tenant").into_iden()
    }
}

/// Applies every pending migration of the shared store: its own tables, then the ledger tables.
///
/// # Errors
///
/// Returns the first migration error.
pub async fn migrate_shared_store(conn: &DatabaseConnection) -> Result<(), DbErr> {
    SharedMigrator::up(conn, None).await?;
    TenantMigrator::up(conn, None).await
}
