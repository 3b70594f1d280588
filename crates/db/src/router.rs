//! Tenant Router: maps a principal to the store its requests run against.
//!
//! Resolution happens once per logical operation; callers carry the returned
//! [`StoreHandle`] through every read and write of that operation.

use distinta_core::audit::EntityKind;
use distinta_core::tenancy::TenantRouting;
use distinta_shared::types::{TenantId, UserId};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::repositories::identity::{IdentityRepository, ProfileAssignment};
use crate::repositories::replication::{IdentityReplicator, ReplicationOutcome};
use crate::store::{StoreHandle, StoreRegistry};

/// Outcome of a profile (re)assignment, including best-effort mirroring.
#[derive(Debug, Clone)]
pub struct AssignmentReport {
    /// The committed assignment.
    pub assignment: ProfileAssignment,
    /// Mirroring into the new tenant store, if there is one.
    pub mirrored: Option<ReplicationOutcome>,
    /// Removal of the stale mirror, if the store changed.
    pub removed: Option<ReplicationOutcome>,
}

/// Resolves stores for principals and keeps identity mirrors in step.
#[derive(Debug, Clone)]
pub struct TenantRouter {
    registry: StoreRegistry,
    replicator: IdentityReplicator,
}

impl TenantRouter {
    /// Creates a router over a registry.
    #[must_use]
    pub const fn new(registry: StoreRegistry, replicator: IdentityReplicator) -> Self {
        Self {
            registry,
            replicator,
        }
    }

    /// The underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    /// Identity repository over the shared store.
    #[must_use]
    pub fn identities(&self) -> IdentityRepository {
        IdentityRepository::new(self.registry.shared().clone())
    }

    /// Store for the principal's tenant, or the shared store when the principal has no
    /// profile or its tenant is inactive.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStore` when the tenant points at an unconfigured store.
    pub async fn resolve_store(&self, principal: UserId) -> Result<StoreHandle, StoreError> {
        let link = self.identities().profile_link(principal).await?;
        let target = TenantRouting::resolve(link.as_ref());
        debug!(user_id = %principal, store = ?target, "store resolved");
        self.registry.handle_for(&target).await
    }

    /// Like [`TenantRouter::resolve_store`], but shared entity kinds always resolve to the
    /// shared store.
    ///
    /// # Errors
    ///
    /// Same as [`TenantRouter::resolve_store`].
    pub async fn resolve_for_entity(
        &self,
        principal: UserId,
        kind: EntityKind,
    ) -> Result<StoreHandle, StoreError> {
        if kind.is_shared() {
            return Ok(self.registry.shared().clone());
        }
        let link = self.identities().profile_link(principal).await?;
        let target = TenantRouting::resolve_for_entity(kind, link.as_ref());
        self.registry.handle_for(&target).await
    }

    /// Mirrors the principal's identity record into `target`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the principal has no identity record in the shared store.
    /// Mirroring failures are reported in the outcome, never as an error.
    pub async fn sync_identity(
        &self,
        principal: UserId,
        target: &StoreHandle,
    ) -> Result<ReplicationOutcome, StoreError> {
        let user = self.identities().get_user(principal).await?;
        Ok(self.replicator.sync_identity(&user, target).await)
    }

    /// Removes the principal's mirror from `target`.
    pub async fn remove_identity(&self, principal: UserId, target: &StoreHandle) -> ReplicationOutcome {
        self.replicator.remove_identity(principal, target).await
    }

    /// Assigns the user to a tenant, then mirrors the identity into the new tenant store and
    /// drops the stale mirror from the previous one.
    ///
    /// # Errors
    ///
    /// Only the shared-store write can fail the call; mirroring is best-effort.
    pub async fn assign_profile(
        &self,
        user: UserId,
        tenant: Option<TenantId>,
    ) -> Result<AssignmentReport, StoreError> {
        let identities = self.identities();
        let assignment = identities.assign_profile(user, tenant).await?;
        let record = identities.get_user(user).await?;

        let mirrored = match &assignment.current_store {
            Some(key) => Some(match self.registry.tenant(key).await {
                Ok(store) => self.replicator.sync_identity(&record, &store).await,
                Err(err) => {
                    warn!(store = %key, user_id = %user, error = %err, "tenant store unavailable for mirroring");
                    ReplicationOutcome::Failed {
                        attempts: 0,
                        error: err.to_string(),
                    }
                }
            }),
            None => None,
        };

        let removed = match (&assignment.previous_store, assignment.store_changed()) {
            (Some(key), true) => Some(match self.registry.tenant(key).await {
                Ok(store) => self.replicator.remove_identity(user, &store).await,
                Err(err) => {
                    warn!(store = %key, user_id = %user, error = %err, "previous tenant store unavailable");
                    ReplicationOutcome::Failed {
                        attempts: 0,
                        error: err.to_string(),
                    }
                }
            }),
            _ => None,
        };

        Ok(AssignmentReport {
            assignment,
            mirrored,
            removed,
        })
    }
}
