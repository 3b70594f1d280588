//! Roles and tenant routing.
//!
//! # Modules
//!
//! - `role` - Operator/manager/admin roles and the principal acting on the ledger
//! - `routing` - Which store a principal or an entity kind resolves to

pub mod role;
pub mod routing;

pub use role::{Principal, Role};
pub use routing::{ProfileLink, StoreTarget, TenantRouting};
