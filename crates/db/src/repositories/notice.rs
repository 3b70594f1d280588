//! Customer notices and payment reminders.

use chrono::{DateTime, Utc};
use distinta_core::audit::{AuditAction, AuditEntry, EntityKind, EntityRef};
use distinta_core::notice::{NoticeKind, NoticeState, reminder_text};
use distinta_shared::types::{CustomerId, NoticeId, PageRequest, PageResponse, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::audit;
use super::customer::CustomerRepository;
use crate::entities::sea_orm_active_enums::{NoticeKind as StoredKind, NoticeState as StoredState};
use crate::entities::{customers, notices};
use crate::error::StoreError;
use crate::store::{StoreHandle, for_update};

/// Input for sending a notice to a customer.
#[derive(Debug, Clone, Validate)]
pub struct CreateNoticeInput {
    /// Recipient.
    pub customer_id: CustomerId,
    /// Kind of notice.
    pub kind: NoticeKind,
    /// Message body.
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

fn notice_ref(id: Uuid) -> EntityRef {
    EntityRef::new(EntityKind::Notice, id)
}

async fn insert_notice<C: ConnectionTrait>(
    conn: &C,
    customer: Uuid,
    kind: NoticeKind,
    content: String,
    operator: Uuid,
    at: DateTime<Utc>,
) -> Result<notices::Model, StoreError> {
    let notice = notices::ActiveModel {
        id: Set(NoticeId::new().into_inner()),
        customer_id: Set(customer),
        kind: Set(kind.into()),
        content: Set(content),
        state: Set(NoticeState::Unread.into()),
        operator_id: Set(Some(operator)),
        read_at: Set(None),
        created_at: Set(at.into()),
    }
    .insert(conn)
    .await?;

    audit::append(
        conn,
        AuditEntry::new(operator, AuditAction::Create, notice_ref(notice.id), None)
            .with_snapshots(None, serde_json::to_value(&notice).ok()),
    )
    .await?;
    Ok(notice)
}

/// Notice repository for one store.
#[derive(Debug, Clone)]
pub struct NoticeRepository {
    store: StoreHandle,
}

impl NoticeRepository {
    /// Creates a new notice repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Sends a notice to a customer. It starts unread.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty content or `NotFound` for an unknown customer.
    pub async fn create(
        &self,
        input: CreateNoticeInput,
        operator: UserId,
    ) -> Result<notices::Model, StoreError> {
        input.validate()?;
        let txn = self.store.conn().begin().await?;
        let customer = customers::Entity::find_by_id(input.customer_id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Customer, input.customer_id))?;

        let notice = insert_notice(
            &txn,
            customer.id,
            input.kind,
            input.content,
            operator.into_inner(),
            Utc::now(),
        )
        .await?;
        txn.commit().await?;

        info!(
            store = self.store.label(),
            notice_id = %notice.id,
            customer_id = %customer.id,
            kind = %input.kind,
            "notice sent"
        );
        Ok(notice)
    }

    /// Marks a notice as read. Returns `false`, writing nothing, when it already was.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown notice.
    pub async fn mark_read(&self, id: NoticeId, actor: UserId) -> Result<bool, StoreError> {
        let txn = self.store.conn().begin().await?;
        let before = for_update(notices::Entity::find_by_id(id.into_inner()), &txn)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Notice, id))?;

        let Some(state) = NoticeState::from(before.state).mark_read() else {
            return Ok(false);
        };
        let mut active: notices::ActiveModel = before.clone().into();
        active.state = Set(state.into());
        active.read_at = Set(Some(Utc::now().into()));
        let after = active.update(&txn).await?;

        audit::append(
            &txn,
            AuditEntry::new(actor.into_inner(), AuditAction::StatusChange, notice_ref(after.id), None)
                .with_snapshots(
                    serde_json::to_value(&before).ok(),
                    serde_json::to_value(&after).ok(),
                ),
        )
        .await?;
        txn.commit().await?;
        Ok(true)
    }

    /// A customer's notices newest first, optionally only the unread ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_customer(
        &self,
        customer: CustomerId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<PageResponse<notices::Model>, StoreError> {
        let mut query =
            notices::Entity::find().filter(notices::Column::CustomerId.eq(customer.into_inner()));
        if unread_only {
            query = query.filter(notices::Column::State.eq(StoredState::Unread));
        }

        let total = query.clone().count(self.store.conn()).await?;
        let rows = query
            .order_by_desc(notices::Column::CreatedAt)
            .order_by_desc(notices::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.store.conn())
            .await?;
        Ok(PageResponse::new(rows, page, total))
    }

    /// Sends a payment reminder to every overdue debtor that has no unread reminder yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or write fails; nothing is written in that case.
    pub async fn send_overdue_reminders(
        &self,
        operator: UserId,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<notices::Model>, StoreError> {
        let overdue = CustomerRepository::new(self.store.clone())
            .overdue(days, now)
            .await?;

        let txn = self.store.conn().begin().await?;
        let mut sent = Vec::new();
        for entry in overdue {
            let pending = notices::Entity::find()
                .filter(notices::Column::CustomerId.eq(entry.customer.id))
                .filter(notices::Column::Kind.eq(StoredKind::Reminder))
                .filter(notices::Column::State.eq(StoredState::Unread))
                .count(&txn)
                .await?;
            if pending > 0 {
                continue;
            }
            let content = reminder_text(
                &entry.customer.display_name(),
                entry.customer.balance,
                entry.last_unsettled_at.date_naive(),
            );
            sent.push(
                insert_notice(
                    &txn,
                    entry.customer.id,
                    NoticeKind::Reminder,
                    content,
                    operator.into_inner(),
                    now,
                )
                .await?,
            );
        }
        txn.commit().await?;

        info!(store = self.store.label(), count = sent.len(), days, "overdue reminders sent");
        Ok(sent)
    }
}
