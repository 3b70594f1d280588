//! `SeaORM` entity definitions.
//!
//! `users`, `tenants` and `user_profiles` live in the shared store; `users` is also
//! mirrored into every tenant store. Everything else is a tenant-store table.

pub mod prelude;

pub mod account_transfers;
pub mod audit_log;
pub mod balance_snapshots;
pub mod cash_balance_snapshots;
pub mod cash_movements;
pub mod cash_sessions;
pub mod customers;
pub mod financial_accounts;
pub mod movements;
pub mod notices;
pub mod reconciliation_checks;
pub mod sea_orm_active_enums;
pub mod tenants;
pub mod user_profiles;
pub mod users;
