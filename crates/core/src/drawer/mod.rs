//! Cash drawer sessions ("distinte").
//!
//! This module implements the session state machine
//! (open → closed → verified, with gated reopen) and the close formula.
//!
//! # Modules
//!
//! - `types` - Session states, close inputs/outcomes, audit snapshot
//! - `error` - Drawer-specific error types
//! - `service` - State transition and totals logic

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::DrawerError;
pub use service::DrawerService;
pub use types::{CloseInput, CloseOutcome, ReopenRequest, SessionSnapshot, SessionState};
