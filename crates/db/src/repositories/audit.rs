//! Audit trail repository.
//!
//! Entries are appended inside the transaction of the mutation they describe, through
//! [`append`]. The repository itself offers the standalone `log_action` and the listing.

use chrono::Utc;
use distinta_core::audit::{AuditAction, AuditEntry, EntityRef};
use distinta_shared::types::{LogId, PageRequest, PageResponse, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value;

use crate::entities::audit_log;
use crate::error::StoreError;
use crate::store::StoreHandle;

/// Persists one audit entry on the given connection or transaction.
pub(crate) async fn append<C: ConnectionTrait>(
    conn: &C,
    entry: AuditEntry,
) -> Result<audit_log::Model, DbErr> {
    audit_log::ActiveModel {
        id: Set(LogId::new().into_inner()),
        actor_id: Set(entry.actor_id),
        action: Set(entry.action.into()),
        entity_kind: Set(entry.entity.kind.as_str().to_string()),
        entity_id: Set(entry.entity.id),
        description: Set(entry.description),
        data_before: Set(entry.before),
        data_after: Set(entry.after),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
}

/// Audit repository for one store.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    store: StoreHandle,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Appends an entry outside any other mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (e.g. the actor is not mirrored in this store).
    pub async fn log_action(
        &self,
        actor: UserId,
        entity: EntityRef,
        action: AuditAction,
        description: Option<String>,
        before: Option<Value>,
        after: Option<Value>,
    ) -> Result<LogId, StoreError> {
        let entry = AuditEntry::new(actor.into_inner(), action, entity, description)
            .with_snapshots(before, after);
        let row = append(self.store.conn(), entry).await?;
        Ok(LogId::from_uuid(row.id))
    }

    /// Lists entries newest first, optionally for one entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        entity: Option<EntityRef>,
        page: PageRequest,
    ) -> Result<PageResponse<audit_log::Model>, StoreError> {
        let mut query = audit_log::Entity::find();
        if let Some(entity) = entity {
            query = query
                .filter(audit_log::Column::EntityKind.eq(entity.kind.as_str()))
                .filter(audit_log::Column::EntityId.eq(entity.id));
        }

        let total = query.clone().count(self.store.conn()).await?;
        let rows = query
            .order_by_desc(audit_log::Column::CreatedAt)
            .order_by_desc(audit_log::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.store.conn())
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }
}
