//! Common types used across the ledger.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{BALANCE_TOLERANCE, MONEY_SCALE, is_within_tolerance, round_money};
pub use pagination::{PageMeta, PageRequest, PageResponse};
