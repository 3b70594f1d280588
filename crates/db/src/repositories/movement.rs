//! Movement repository and the Settlement Protocol.
//!
//! Every mutation recomputes the owning customer's balance explicitly, inside the same
//! transaction, once. `settle` is the only path that marks a movement settled.

use chrono::{DateTime, Utc};
use distinta_core::audit::{AuditAction, AuditEntry, EntityKind, EntityRef};
use distinta_core::drawer::DrawerService;
use distinta_core::movement::{MovementError, MovementKind, SettlementService, SettlementSubject};
use distinta_shared::types::{CustomerId, MovementId, SessionId, UserId, round_money};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde_json::json;
use tracing::info;
use validator::Validate;

use super::customer::recompute_balance;
use super::session::open_session_of;
use super::audit;
use crate::entities::sea_orm_active_enums::SessionState;
use crate::entities::{cash_sessions, customers, movements};
use crate::error::StoreError;
use crate::store::{StoreHandle, for_update};

/// Input for recording a movement.
#[derive(Debug, Clone, Validate)]
pub struct RecordMovementInput {
    /// Customer the movement belongs to.
    pub customer_id: CustomerId,
    /// Kind; decides the sign of the stored amount.
    pub kind: MovementKind,
    /// Amount as entered; its sign is ignored.
    pub amount: Decimal,
    /// Drawer session the movement is booked in.
    pub session_id: Option<SessionId>,
    /// When it happened; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
    /// Notes.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Changes to an unsettled movement.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateMovementInput {
    /// New kind.
    pub kind: Option<MovementKind>,
    /// New amount as entered.
    pub amount: Option<Decimal>,
    /// New notes; `Some(None)` clears them.
    #[validate(length(max = 1000))]
    pub notes: Option<Option<String>>,
}

fn stored_amount(kind: MovementKind, amount: Decimal) -> Result<Decimal, MovementError> {
    let amount = round_money(kind.normalize(amount));
    if amount.is_zero() {
        return Err(MovementError::ZeroAmount);
    }
    Ok(amount)
}

fn movement_ref(id: uuid::Uuid) -> EntityRef {
    EntityRef::new(EntityKind::Movement, id)
}

/// Movement repository for one store.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    store: StoreHandle,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Records a movement and recomputes the customer's balance.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAmount`, `NotFound` for an unknown customer or session, or
    /// `SessionNotOpen` when the session is not open or not the operator's.
    pub async fn record(
        &self,
        input: RecordMovementInput,
        operator: UserId,
    ) -> Result<movements::Model, StoreError> {
        input.validate()?;
        let amount = stored_amount(input.kind, input.amount)?;

        let txn = self.store.conn().begin().await?;
        let customer = customers::Entity::find_by_id(input.customer_id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Customer, input.customer_id))?;

        if let Some(session_id) = input.session_id {
            let session = cash_sessions::Entity::find_by_id(session_id.into_inner())
                .one(&txn)
                .await?
                .ok_or_else(|| StoreError::not_found(EntityKind::CashSession, session_id))?;
            if session.state != SessionState::Open || session.operator_id != operator.into_inner() {
                return Err(MovementError::SessionNotOpen(session.id).into());
            }
        }

        let now = Utc::now();
        let movement = movements::ActiveModel {
            id: Set(MovementId::new().into_inner()),
            customer_id: Set(customer.id),
            kind: Set(input.kind.into()),
            amount: Set(amount),
            occurred_at: Set(input.occurred_at.unwrap_or(now).into()),
            settled: Set(false),
            session_id: Set(input.session_id.map(SessionId::into_inner)),
            origin_movement_id: Set(None),
            notes: Set(input.notes),
            created_by: Set(operator.into_inner()),
            modified_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let balance = recompute_balance(&txn, customer.id).await?;
        audit::append(
            &txn,
            AuditEntry::new(
                operator.into_inner(),
                AuditAction::Create,
                movement_ref(movement.id),
                None,
            )
            .with_snapshots(None, serde_json::to_value(&movement).ok()),
        )
        .await?;
        txn.commit().await?;

        info!(
            store = self.store.label(),
            movement_id = %movement.id,
            customer_id = %customer.id,
            %amount,
            %balance,
            "movement recorded"
        );
        Ok(movement)
    }

    /// Edits an unsettled movement, re-normalizing the sign.
    ///
    /// # Errors
    ///
    /// Returns `SettledImmutable` for a settled movement.
    pub async fn update(
        &self,
        id: MovementId,
        input: UpdateMovementInput,
        operator: UserId,
    ) -> Result<movements::Model, StoreError> {
        input.validate()?;
        let txn = self.store.conn().begin().await?;

        let before = for_update(movements::Entity::find_by_id(id.into_inner()), &txn)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Movement, id))?;
        if before.settled {
            return Err(MovementError::SettledImmutable(before.id).into());
        }

        let kind = input.kind.unwrap_or_else(|| before.kind.into());
        let amount = stored_amount(kind, input.amount.unwrap_or(before.amount))?;

        let mut active: movements::ActiveModel = before.clone().into();
        active.kind = Set(kind.into());
        active.amount = Set(amount);
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.modified_by = Set(Some(operator.into_inner()));
        active.updated_at = Set(Utc::now().into());
        let after = active.update(&txn).await?;

        recompute_balance(&txn, after.customer_id).await?;
        audit::append(
            &txn,
            AuditEntry::new(operator.into_inner(), AuditAction::Update, movement_ref(after.id), None)
                .with_snapshots(
                    serde_json::to_value(&before).ok(),
                    serde_json::to_value(&after).ok(),
                ),
        )
        .await?;
        txn.commit().await?;
        Ok(after)
    }

    /// Deletes an unsettled movement that no compensating entry points to.
    ///
    /// # Errors
    ///
    /// Returns `SettledImmutable` or `HasCompensatingEntry`.
    pub async fn delete(&self, id: MovementId, operator: UserId) -> Result<(), StoreError> {
        let txn = self.store.conn().begin().await?;

        let movement = for_update(movements::Entity::find_by_id(id.into_inner()), &txn)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Movement, id))?;
        if movement.settled {
            return Err(MovementError::SettledImmutable(movement.id).into());
        }
        let compensations = movements::Entity::find()
            .filter(movements::Column::OriginMovementId.eq(movement.id))
            .count(&txn)
            .await?;
        if compensations > 0 {
            return Err(MovementError::HasCompensatingEntry(movement.id).into());
        }

        movements::Entity::delete_by_id(movement.id).exec(&txn).await?;
        recompute_balance(&txn, movement.customer_id).await?;
        audit::append(
            &txn,
            AuditEntry::new(operator.into_inner(), AuditAction::Delete, movement_ref(movement.id), None)
                .with_snapshots(serde_json::to_value(&movement).ok(), None),
        )
        .await?;
        txn.commit().await?;
        Ok(())
    }

    /// Gets a movement by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is none.
    pub async fn get(&self, id: MovementId) -> Result<movements::Model, StoreError> {
        movements::Entity::find_by_id(id.into_inner())
            .one(self.store.conn())
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Movement, id))
    }

    /// Settles a movement by booking its compensating entry in the operator's open session.
    ///
    /// Returns `false`, writing nothing, when the movement is already settled or the operator
    /// has no open session.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown movement; database failures abort everything.
    pub async fn settle(&self, id: MovementId, operator: UserId) -> Result<bool, StoreError> {
        let txn = self.store.conn().begin().await?;

        let original = for_update(movements::Entity::find_by_id(id.into_inner()), &txn)
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Movement, id))?;
        if original.settled {
            info!(store = self.store.label(), movement_id = %original.id, "movement already settled");
            return Ok(false);
        }
        let Some(session) = open_session_of(&txn, operator.into_inner()).await? else {
            info!(
                store = self.store.label(),
                movement_id = %original.id,
                operator_id = %operator,
                "settlement refused: no open cash session"
            );
            return Ok(false);
        };

        let plan = SettlementService::plan(&SettlementSubject {
            movement_id: original.id,
            kind: original.kind.into(),
            amount: original.amount,
            settled: original.settled,
            booked_on: DrawerService::business_date(
                original.occurred_at.with_timezone(&Utc),
                self.store.settings().timezone,
            ),
        })?;

        let now = Utc::now();
        let compensating = movements::ActiveModel {
            id: Set(MovementId::new().into_inner()),
            customer_id: Set(original.customer_id),
            kind: Set(plan.kind.into()),
            amount: Set(plan.amount),
            occurred_at: Set(now.into()),
            settled: Set(true),
            session_id: Set(Some(session.id)),
            origin_movement_id: Set(Some(plan.origin_movement_id)),
            notes: Set(Some(plan.note)),
            created_by: Set(operator.into_inner()),
            modified_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        // Flag only, guarded on the unsettled state.
        let flagged = movements::Entity::update_many()
            .col_expr(movements::Column::Settled, Expr::value(true))
            .col_expr(movements::Column::ModifiedBy, Expr::value(Some(operator.into_inner())))
            .col_expr(
                movements::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            )
            .filter(movements::Column::Id.eq(original.id))
            .filter(movements::Column::Settled.eq(false))
            .exec(&txn)
            .await?;
        if flagged.rows_affected != 1 {
            txn.rollback().await?;
            return Ok(false);
        }

        let balance = recompute_balance(&txn, original.customer_id).await?;
        audit::append(
            &txn,
            AuditEntry::new(operator.into_inner(), AuditAction::Payment, movement_ref(original.id), None)
                .with_snapshots(
                    Some(json!({ "settled": false })),
                    Some(json!({ "settled": true, "compensating_movement_id": compensating.id })),
                ),
        )
        .await?;
        txn.commit().await?;

        info!(
            store = self.store.label(),
            movement_id = %original.id,
            compensating_id = %compensating.id,
            session_id = %session.id,
            %balance,
            "movement settled"
        );
        Ok(true)
    }
}
