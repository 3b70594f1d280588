//! Customer movements and the balance engine.
//!
//! # Modules
//!
//! - `types` - Movement kinds (with their sign convention) and risk ratings
//! - `error` - Movement-specific error types
//! - `balance` - Unsettled-sum balance, credit view, running balances
//! - `settlement` - Compensating entry planning

pub mod balance;
pub mod error;
pub mod settlement;
pub mod types;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod settlement_props;

pub use balance::{BalanceService, CreditView, RunningBalance};
pub use error::MovementError;
pub use settlement::{SettlementPlan, SettlementService, SettlementSubject};
pub use types::{MovementKind, RiskRating};
