//! Tenant store routing decisions.
//!
//! The decision is pure: given what the shared store says about a principal,
//! pick the target store. Connecting to it is the db crate's job.

use serde::{Deserialize, Serialize};

use crate::audit::EntityKind;

/// What the shared store knows about a principal's tenant assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
    /// Store key of the assigned tenant.
    pub store_key: String,
    /// Whether the assigned tenant is active.
    pub tenant_active: bool,
}

/// The store an operation must run against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreTarget {
    /// The shared store (identity, tenant registry).
    Shared,
    /// A tenant store, by key.
    Tenant(String),
}

impl StoreTarget {
    /// Returns the tenant store key, if any.
    #[must_use]
    pub fn tenant_key(&self) -> Option<&str> {
        match self {
            Self::Shared => None,
            Self::Tenant(key) => Some(key),
        }
    }
}

/// Stateless routing rules.
pub struct TenantRouting;

impl TenantRouting {
    /// Resolves the store for a principal from its profile link.
    ///
    /// Missing profiles and inactive tenants fall back to the shared store.
    #[must_use]
    pub fn resolve(profile: Option<&ProfileLink>) -> StoreTarget {
        match profile {
            Some(link) if link.tenant_active && !link.store_key.is_empty() => {
                StoreTarget::Tenant(link.store_key.clone())
            }
            _ => StoreTarget::Shared,
        }
    }

    /// Resolves the store for an entity kind on behalf of a principal.
    ///
    /// Shared entity kinds ignore the principal entirely.
    #[must_use]
    pub fn resolve_for_entity(kind: EntityKind, profile: Option<&ProfileLink>) -> StoreTarget {
        if kind.is_shared() {
            StoreTarget::Shared
        } else {
            Self::resolve(profile)
        }
    }
}
