//! Reconciliation of theoretical against observed balances.
//!
//! # Modules
//!
//! - `types` - Check states and computed figures
//! - `service` - Classification, cash period totals, category totals
//! - `snapshot` - Periodic balance snapshot totals and liquidity trend

pub mod service;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::ReconciliationService;
pub use snapshot::{LiquidityTrend, SnapshotTotals};
pub use types::{CheckFigures, CheckState, PeriodTotals};
