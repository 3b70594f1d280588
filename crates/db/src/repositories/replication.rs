//! Identity mirroring into tenant stores.
//!
//! Tenant tables hold foreign keys to `users`, so each tenant store keeps a read-only copy
//! of the identities routed to it. Mirroring is idempotent and best-effort: it retries,
//! logs every failure, and reports an outcome instead of failing the caller.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use distinta_shared::config::ReplicationConfig;
use distinta_shared::types::UserId;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::{error, info, warn};

use crate::entities::{audit_log, cash_sessions, movements, users};
use crate::error::is_constraint_violation;
use crate::store::StoreHandle;

/// What happened to a mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationOutcome {
    /// The identity is present and current in the target store.
    Mirrored {
        /// Attempts used.
        attempts: u32,
    },
    /// The mirror was deleted (or was already absent).
    Removed,
    /// The mirror is still referenced by ledger rows and was kept.
    Retained,
    /// Every attempt failed.
    Failed {
        /// Attempts used.
        attempts: u32,
        /// Last error.
        error: String,
    },
}

impl ReplicationOutcome {
    /// True unless every attempt failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Mirrors identity records with bounded retries.
#[derive(Debug, Clone, Copy)]
pub struct IdentityReplicator {
    max_attempts: u32,
    backoff: Duration,
}

impl Default for IdentityReplicator {
    fn default() -> Self {
        Self::new(3)
    }
}

impl IdentityReplicator {
    /// Creates a replicator making at most `max_attempts` tries (at least one).
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            backoff: Duration::from_millis(50),
        }
    }

    /// Creates a replicator from configuration.
    #[must_use]
    pub const fn from_config(config: &ReplicationConfig) -> Self {
        Self::new(config.max_attempts)
    }

    /// Upserts `user` into `target` under the same id.
    pub async fn sync_identity(&self, user: &users::Model, target: &StoreHandle) -> ReplicationOutcome {
        let outcome = self
            .retry("sync_identity", user.id, target, || upsert_mirror(target, user))
            .await;
        match outcome {
            Ok(attempts) => {
                info!(store = target.label(), user_id = %user.id, attempts, "identity mirrored");
                ReplicationOutcome::Mirrored { attempts }
            }
            Err((attempts, err)) => ReplicationOutcome::Failed {
                attempts,
                error: err.to_string(),
            },
        }
    }

    /// Deletes the mirror of `user` from `target` unless ledger rows still reference it.
    pub async fn remove_identity(&self, user: UserId, target: &StoreHandle) -> ReplicationOutcome {
        let user_id = user.into_inner();
        match mirror_in_use(target, user_id).await {
            Ok(true) => {
                warn!(
                    store = target.label(),
                    user_id = %user_id,
                    "identity mirror still referenced by ledger rows, keeping it"
                );
                return ReplicationOutcome::Retained;
            }
            Ok(false) => {}
            Err(err) => {
                warn!(store = target.label(), user_id = %user_id, error = %err, "could not inspect identity mirror");
            }
        }

        let outcome = self
            .retry("remove_identity", user_id, target, || async move {
                users::Entity::delete_by_id(user_id)
                    .exec(target.conn())
                    .await
                    .map(|_| ())
            })
            .await;
        match outcome {
            Ok(_) => ReplicationOutcome::Removed,
            Err((_, err)) if is_constraint_violation(&err) => {
                warn!(store = target.label(), user_id = %user_id, "identity mirror referenced, keeping it");
                ReplicationOutcome::Retained
            }
            Err((attempts, err)) => ReplicationOutcome::Failed {
                attempts,
                error: err.to_string(),
            },
        }
    }

    async fn retry<F, Fut>(
        &self,
        operation: &'static str,
        user_id: uuid::Uuid,
        target: &StoreHandle,
        mut attempt_once: F,
    ) -> Result<u32, (u32, DbErr)>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), DbErr>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_once().await {
                Ok(()) => return Ok(attempt),
                Err(err) if is_constraint_violation(&err) => return Err((attempt, err)),
                Err(err) if attempt < self.max_attempts => {
                    warn!(
                        operation,
                        store = target.label(),
                        user_id = %user_id,
                        attempt,
                        error = %err,
                        "identity replication attempt failed"
                    );
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(
                        operation,
                        store = target.label(),
                        user_id = %user_id,
                        attempts = attempt,
                        error = %err,
                        "identity replication gave up"
                    );
                    return Err((attempt, err));
                }
            }
        }
    }
}

async fn upsert_mirror(target: &StoreHandle, user: &users::Model) -> Result<(), DbErr> {
    let mirror = users::ActiveModel {
        id: Set(user.id),
        username: Set(user.username.clone()),
        full_name: Set(user.full_name.clone()),
        email: Set(user.email.clone()),
        role: Set(user.role),
        is_active: Set(user.is_active),
        is_staff: Set(user.is_staff),
        is_superuser: Set(user.is_superuser),
        created_at: Set(user.created_at),
        updated_at: Set(Utc::now().into()),
    };

    users::Entity::insert(mirror)
        .on_conflict(
            OnConflict::column(users::Column::Id)
                .update_columns([
                    users::Column::Username,
                    users::Column::FullName,
                    users::Column::Email,
                    users::Column::Role,
                    users::Column::IsActive,
                    users::Column::IsStaff,
                    users::Column::IsSuperuser,
                    users::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(target.conn())
        .await?;
    Ok(())
}

/// Whether ledger history in `target` points at the mirror.
async fn mirror_in_use(target: &StoreHandle, user_id: uuid::Uuid) -> Result<bool, DbErr> {
    let conn = target.conn();
    let audited = audit_log::Entity::find()
        .filter(audit_log::Column::ActorId.eq(user_id))
        .count(conn)
        .await?;
    let recorded = movements::Entity::find()
        .filter(movements::Column::CreatedBy.eq(user_id))
        .count(conn)
        .await?;
    let sessions = cash_sessions::Entity::find()
        .filter(cash_sessions::Column::OperatorId.eq(user_id))
        .count(conn)
        .await?;
    Ok(audited + recorded + sessions > 0)
}
