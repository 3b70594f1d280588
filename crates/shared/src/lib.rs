//! Shared types, errors, and configuration for the Distinta cash ledger.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Money helpers with two-decimal rounding
//! - Pagination types for audit and reconciliation listings
//! - The caller-facing error taxonomy
//! - Configuration management (store urls, ledger settings, replication)

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorKind};
