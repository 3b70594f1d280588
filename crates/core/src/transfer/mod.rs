//! Financial accounts and the transfer engine.
//!
//! Account balances move only through transfers: two-sided transfers,
//! single-sided deposits/withdrawals, and direct adjustments. Each records
//! the pre/post balance of every side it touches so it can be undone.
//!
//! # Modules
//!
//! - `types` - Account kinds/categories, transfer kinds, cash movement kinds, plans
//! - `error` - Transfer-specific error types
//! - `service` - Pre/post balance math

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::TransferError;
pub use service::TransferService;
pub use types::{
    AccountCategory, AccountKind, CashMovementKind, DEFAULT_ACCOUNTS, DefaultAccount, SidePlan,
    TransferKind, TransferPlan,
};
