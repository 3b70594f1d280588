//! Database layer of the ledger: entities, migrators, stores, and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions shared by every tenant store
//! - Shared and tenant schema migrators
//! - The store registry and the Tenant Router
//! - Repositories bound to one store, and the [`api`] facade over them

pub mod api;
#[allow(missing_docs)]
pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod router;
pub mod store;

pub use error::StoreError;
pub use migration::{SharedMigrator, TenantMigrator, migrate_shared_store};
pub use router::{AssignmentReport, TenantRouter};
pub use store::{LedgerSettings, StoreHandle, StoreRegistry, connect};
