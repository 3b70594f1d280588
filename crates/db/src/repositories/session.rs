//! Drawer Lifecycle persistence.
//!
//! Opening withdraws the opening cash from the agency cash account and closing deposits
//! the counted cash, both as direct adjustments with their cash trail. Verification
//! recomputes the agency cash from the latest close posting onwards.

use chrono::Utc;
use distinta_core::audit::{AuditAction, AuditEntry, EntityKind, EntityRef};
use distinta_core::drawer::{CloseInput, DrawerService, ReopenRequest};
use distinta_core::tenancy::Principal;
use distinta_core::transfer::CashMovementKind;
use distinta_shared::types::{SessionId, UserId};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::cash_ledger::{agency_cash_account, history};
use super::transfer::{PostingContext, adjust_balance};
use super::audit;
use crate::entities::sea_orm_active_enums::{CashMovementKind as StoredCashKind, SessionState};
use crate::entities::{cash_movements, cash_sessions, movements, users};
use crate::error::StoreError;
use crate::store::{StoreHandle, for_update};

/// Close request for a session.
#[derive(Debug, Clone, Default, Validate)]
pub struct CloseSessionInput {
    /// Counted values.
    pub values: CloseInput,
    /// Notes stored on the session.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Live figures of a session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// The session.
    pub session: cash_sessions::Model,
    /// Movements booked in it.
    pub movement_count: usize,
    /// Sum of positive amounts.
    pub total_in: Decimal,
    /// Absolute sum of negative amounts.
    pub total_out: Decimal,
    /// What the close formula gives for the supplied counted cash.
    pub projected_difference: Decimal,
}

/// The operator's open session, if any.
pub(crate) async fn open_session_of<C: ConnectionTrait>(
    conn: &C,
    operator: Uuid,
) -> Result<Option<cash_sessions::Model>, StoreError> {
    Ok(cash_sessions::Entity::find()
        .filter(cash_sessions::Column::OperatorId.eq(operator))
        .filter(cash_sessions::Column::State.eq(SessionState::Open))
        .order_by_desc(cash_sessions::Column::StartTime)
        .one(conn)
        .await?)
}

async fn mirrored_user<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    lock: bool,
) -> Result<users::Model, StoreError> {
    let query = users::Entity::find_by_id(id);
    let query = if lock { for_update(query, conn) } else { query };
    query
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found(EntityKind::User, id))
}

async fn load_session<C: ConnectionTrait>(
    conn: &C,
    id: SessionId,
) -> Result<cash_sessions::Model, StoreError> {
    for_update(cash_sessions::Entity::find_by_id(id.into_inner()), conn)
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found(EntityKind::CashSession, id))
}

async fn owned_amounts<C: ConnectionTrait>(
    conn: &C,
    session: Uuid,
) -> Result<Vec<Decimal>, StoreError> {
    Ok(movements::Entity::find()
        .filter(movements::Column::SessionId.eq(session))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| m.amount)
        .collect())
}

fn transition_entry(
    actor: Uuid,
    action: AuditAction,
    before: Option<&cash_sessions::Model>,
    after: &cash_sessions::Model,
) -> AuditEntry {
    AuditEntry::new(actor, action, EntityRef::new(EntityKind::CashSession, after.id), None)
        .with_snapshots(
            before.map(|s| s.snapshot().to_json()),
            Some(after.snapshot().to_json()),
        )
}

/// Agency cash as implied by the trail: the post-balance of the latest session close
/// posting plus every cash movement recorded after it.
///
/// Returns `None` when no closed session has posted yet.
async fn recomputed_agency_cash<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<Option<Decimal>, StoreError> {
    let trail = history(conn, account_id).await?;
    let settled_sessions: Vec<Uuid> = cash_sessions::Entity::find()
        .filter(cash_sessions::Column::State.is_in([SessionState::Closed, SessionState::Verified]))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let Some(anchor) = trail.iter().rposition(|m: &cash_movements::Model| {
        m.kind == StoredCashKind::SessionClose
            && m.session_id.is_some_and(|id| settled_sessions.contains(&id))
    }) else {
        return Ok(None);
    };

    let base = trail[anchor].balance_after;
    let since: Decimal = trail[anchor + 1..].iter().map(|m| m.amount).sum();
    Ok(Some(base + since))
}

/// Drawer session repository for one store.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    store: StoreHandle,
}

impl SessionRepository {
    /// Creates a new session repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Opens a session, withdrawing `opening_cash` from the agency cash account.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyOpen`, `NonPositiveOpeningCash`, `InsufficientAgencyCash`, or
    /// `NotFound` if the operator is not mirrored in this store.
    pub async fn open(
        &self,
        operator: UserId,
        opening_cash: Decimal,
        notes: Option<String>,
    ) -> Result<cash_sessions::Model, StoreError> {
        let txn = self.store.conn().begin().await?;

        // Serializes concurrent opens by the same operator.
        let user = mirrored_user(&txn, operator.into_inner(), true).await?;
        let has_open = open_session_of(&txn, user.id).await?.is_some();
        let cash = agency_cash_account(&txn, self.store.settings()).await?;
        DrawerService::open(user.id, has_open, opening_cash, cash.balance)?;

        let now = Utc::now();
        let at: DateTimeWithTimeZone = now.into();
        let session = cash_sessions::ActiveModel {
            id: Set(SessionId::new().into_inner()),
            operator_id: Set(user.id),
            business_date: Set(DrawerService::business_date(now, self.store.settings().timezone)),
            start_time: Set(at),
            end_time: Set(None),
            opening_cash: Set(opening_cash),
            closing_cash: Set(None),
            total_in: Set(Decimal::ZERO),
            total_out: Set(Decimal::ZERO),
            total_beverage_deduction: Set(Decimal::ZERO),
            terminal_balance: Set(None),
            cash_difference: Set(Decimal::ZERO),
            state: Set(SessionState::Open),
            verified_by: Set(None),
            verified_at: Set(None),
            notes: Set(notes),
            created_at: Set(at),
            updated_at: Set(at),
        }
        .insert(&txn)
        .await?;

        let ctx = PostingContext {
            operator: user.id,
            notes: Some(format!("Prelievo per apertura Distinta N° {}", session.id)),
            at,
            session_id: Some(session.id),
            cash_kind: Some(CashMovementKind::SessionOpen),
        };
        adjust_balance(&txn, &cash, cash.balance - opening_cash, &ctx).await?;
        audit::append(&txn, transition_entry(user.id, AuditAction::Create, None, &session)).await?;

        txn.commit().await?;
        info!(
            store = self.store.label(),
            session_id = %session.id,
            operator_id = %user.id,
            %opening_cash,
            "cash session opened"
        );
        Ok(session)
    }

    /// Closes an open session and deposits the counted cash into the agency cash account.
    ///
    /// A missing `closing_cash` is booked as zero with a warning.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the session is open.
    pub async fn close(
        &self,
        id: SessionId,
        operator: UserId,
        input: CloseSessionInput,
    ) -> Result<cash_sessions::Model, StoreError> {
        input.validate()?;
        let txn = self.store.conn().begin().await?;

        let before = load_session(&txn, id).await?;
        let amounts = owned_amounts(&txn, before.id).await?;
        let outcome = DrawerService::close(before.state.into(), &input.values, amounts)?;
        if outcome.closing_cash_defaulted {
            warn!(
                store = self.store.label(),
                session_id = %before.id,
                "closing cash missing, booked as zero"
            );
        }
        let closer = mirrored_user(&txn, operator.into_inner(), false).await?;
        let owner = mirrored_user(&txn, before.operator_id, false).await?;

        let at: DateTimeWithTimeZone = Utc::now().into();
        let mut active: cash_sessions::ActiveModel = before.clone().into();
        active.closing_cash = Set(Some(outcome.closing_cash));
        active.total_in = Set(outcome.total_in);
        active.total_out = Set(outcome.total_out);
        active.total_beverage_deduction = Set(outcome.total_beverage_deduction);
        active.terminal_balance = Set(outcome.terminal_balance);
        active.cash_difference = Set(outcome.cash_difference);
        active.end_time = Set(Some(at));
        active.state = Set(SessionState::Closed);
        if input.notes.is_some() {
            active.notes = Set(input.notes);
        }
        active.updated_at = Set(at);
        let after = active.update(&txn).await?;

        let cash = agency_cash_account(&txn, self.store.settings()).await?;
        let ctx = PostingContext {
            operator: closer.id,
            notes: Some(format!(
                "Versamento per chiusura Distinta N° {} - Operatore: {}",
                after.id, owner.username
            )),
            at,
            session_id: Some(after.id),
            cash_kind: Some(CashMovementKind::SessionClose),
        };
        adjust_balance(&txn, &cash, cash.balance + outcome.closing_cash, &ctx).await?;
        audit::append(
            &txn,
            transition_entry(closer.id, AuditAction::StatusChange, Some(&before), &after),
        )
        .await?;

        txn.commit().await?;
        info!(
            store = self.store.label(),
            session_id = %after.id,
            closing_cash = %outcome.closing_cash,
            cash_difference = %outcome.cash_difference,
            "cash session closed"
        );
        Ok(after)
    }

    /// Verifies a closed session and recomputes the agency cash balance.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthorizedToVerify` below manager, or `InvalidTransition` unless closed.
    pub async fn verify(
        &self,
        id: SessionId,
        verifier: UserId,
    ) -> Result<cash_sessions::Model, StoreError> {
        let txn = self.store.conn().begin().await?;

        let before = load_session(&txn, id).await?;
        let principal: Principal = mirrored_user(&txn, verifier.into_inner(), false)
            .await?
            .principal();
        let next = DrawerService::verify(
            before.state.into(),
            principal.user_id.into_inner(),
            principal.effective_role(),
        )?;

        let at: DateTimeWithTimeZone = Utc::now().into();
        let mut active: cash_sessions::ActiveModel = before.clone().into();
        active.state = Set(next.into());
        active.verified_by = Set(Some(verifier.into_inner()));
        active.verified_at = Set(Some(at));
        active.updated_at = Set(at);
        let after = active.update(&txn).await?;

        let cash = agency_cash_account(&txn, self.store.settings()).await?;
        if let Some(expected) = recomputed_agency_cash(&txn, cash.id).await? {
            if expected != cash.balance {
                warn!(
                    store = self.store.label(),
                    session_id = %after.id,
                    stored = %cash.balance,
                    %expected,
                    "agency cash drifted, adjusting at verification"
                );
                let ctx = PostingContext {
                    operator: verifier.into_inner(),
                    notes: Some(format!("Ricalcolo cassa per verifica Distinta N° {}", after.id)),
                    at,
                    session_id: Some(after.id),
                    cash_kind: Some(CashMovementKind::SessionVerify),
                };
                adjust_balance(&txn, &cash, expected, &ctx).await?;
            }
        }
        audit::append(
            &txn,
            transition_entry(verifier.into_inner(), AuditAction::StatusChange, Some(&before), &after),
        )
        .await?;

        txn.commit().await?;
        info!(store = self.store.label(), session_id = %after.id, verifier = %verifier, "cash session verified");
        Ok(after)
    }

    /// Reopens a closed session. Cash postings made at close stay in place.
    ///
    /// # Errors
    ///
    /// Returns `CannotReopenVerified`, `NotAuthorizedToReopen`, `AlreadyOpen`, or
    /// `InvalidTransition`.
    pub async fn reopen(
        &self,
        id: SessionId,
        requester: UserId,
    ) -> Result<cash_sessions::Model, StoreError> {
        let txn = self.store.conn().begin().await?;

        let before = load_session(&txn, id).await?;
        let principal = mirrored_user(&txn, requester.into_inner(), false)
            .await?
            .principal();
        let owner_has_open_session = open_session_of(&txn, before.operator_id)
            .await?
            .is_some_and(|open| open.id != before.id);
        let next = DrawerService::reopen(
            before.state.into(),
            &ReopenRequest {
                requester: requester.into_inner(),
                requester_role: principal.effective_role(),
                owner: before.operator_id,
                session_date: before.business_date,
                today: DrawerService::business_date(Utc::now(), self.store.settings().timezone),
                owner_has_open_session,
            },
        )?;

        let mut active: cash_sessions::ActiveModel = before.clone().into();
        active.state = Set(next.into());
        active.end_time = Set(None);
        active.updated_at = Set(Utc::now().into());
        let after = active.update(&txn).await?;
        audit::append(
            &txn,
            transition_entry(requester.into_inner(), AuditAction::Reopen, Some(&before), &after),
        )
        .await?;

        txn.commit().await?;
        info!(store = self.store.label(), session_id = %after.id, requester = %requester, "cash session reopened");
        Ok(after)
    }

    /// The operator's open session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn open_session_for(
        &self,
        operator: UserId,
    ) -> Result<Option<cash_sessions::Model>, StoreError> {
        open_session_of(self.store.conn(), operator.into_inner()).await
    }

    /// Gets a session by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is none.
    pub async fn get(&self, id: SessionId) -> Result<cash_sessions::Model, StoreError> {
        cash_sessions::Entity::find_by_id(id.into_inner())
            .one(self.store.conn())
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::CashSession, id))
    }

    /// Live totals of a session and the difference the close formula would give for
    /// `counted_cash` (zero when absent).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown session.
    pub async fn summary(
        &self,
        id: SessionId,
        counted_cash: Option<Decimal>,
    ) -> Result<SessionSummary, StoreError> {
        let session = self.get(id).await?;
        let amounts = owned_amounts(self.store.conn(), session.id).await?;
        let movement_count = amounts.len();
        let (total_in, total_out) = DrawerService::totals(amounts);
        let projected_difference = DrawerService::cash_difference(
            counted_cash.unwrap_or(Decimal::ZERO),
            total_in,
            total_out,
            session.total_beverage_deduction,
            session.terminal_balance,
        );
        Ok(SessionSummary {
            session,
            movement_count,
            total_in,
            total_out,
            projected_difference,
        })
    }
}

