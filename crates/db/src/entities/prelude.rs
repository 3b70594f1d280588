//! Entity aliases.

pub use super::account_transfers::Entity as AccountTransfers;
pub use super::audit_log::Entity as AuditLog;
pub use super::balance_snapshots::Entity as BalanceSnapshots;
pub use super::cash_balance_snapshots::Entity as CashBalanceSnapshots;
pub use super::cash_movements::Entity as CashMovements;
pub use super::cash_sessions::Entity as CashSessions;
pub use super::customers::Entity as Customers;
pub use super::financial_accounts::Entity as FinancialAccounts;
pub use super::movements::Entity as Movements;
pub use super::notices::Entity as Notices;
pub use super::reconciliation_checks::Entity as ReconciliationChecks;
pub use super::tenants::Entity as Tenants;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::users::Entity as Users;
