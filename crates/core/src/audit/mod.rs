//! Audit trail vocabulary.
//!
//! Every mutating ledger operation writes one append-only entry naming the
//! actor, the action, and the affected entity, optionally with structured
//! before/after snapshots.

pub mod types;

pub use types::{AuditAction, AuditEntry, EntityKind, EntityRef};
