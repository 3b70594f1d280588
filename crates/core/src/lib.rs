//! Ledger rules for the Distinta cash ledger.
//!
//! This crate contains pure business logic with ZERO database dependencies.
//! Every invariant that keeps customer balances, drawer totals, account
//! balances and the audit trail consistent is decided here; the `db` crate
//! only loads rows, calls these services, and persists their output.
//!
//! # Modules
//!
//! - `movement` - Sign convention, balance engine, credit view, settlement plans
//! - `drawer` - Cash drawer session (distinta) state machine and close formula
//! - `transfer` - Financial account kinds and pre/post transfer math
//! - `reconciliation` - Theoretical vs observed balance classification, snapshots
//! - `notice` - Customer notices and payment reminder wording
//! - `audit` - Audit actions and polymorphic entity references
//! - `tenancy` - Roles and tenant store routing decisions

pub mod audit;
pub mod drawer;
pub mod movement;
pub mod notice;
pub mod reconciliation;
pub mod tenancy;
pub mod transfer;
