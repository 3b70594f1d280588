//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `CustomerId` where a `MovementId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for an identity record (operator, manager, admin).");
typed_id!(TenantId, "Unique identifier for a tenant descriptor (one agency).");
typed_id!(ProfileId, "Unique identifier for a user profile (user to tenant link).");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(MovementId, "Unique identifier for a customer movement.");
typed_id!(SessionId, "Unique identifier for a cash drawer session (distinta).");
typed_id!(AccountId, "Unique identifier for a financial account.");
typed_id!(TransferId, "Unique identifier for an account transfer.");
typed_id!(CashMovementId, "Unique identifier for an agency cash movement.");
typed_id!(CashSnapshotId, "Unique identifier for a cash balance snapshot.");
typed_id!(CheckId, "Unique identifier for a reconciliation check.");
typed_id!(SnapshotId, "Unique identifier for a periodic balance snapshot.");
typed_id!(LogId, "Unique identifier for an audit log entry.");
typed_id!(NoticeId, "Unique identifier for a customer notice.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
