//! Agency cash trail: every change to a cash account writes a CashMovement and the
//! matching CashBalanceSnapshot.

use distinta_core::transfer::{CashMovementKind, SidePlan, TransferError};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use distinta_shared::types::{CashMovementId, CashSnapshotId};
use uuid::Uuid;

use crate::entities::{cash_balance_snapshots, cash_movements, financial_accounts};
use crate::error::StoreError;
use crate::store::{LedgerSettings, for_update};

/// Why and by whom a cash balance changed.
#[derive(Debug, Clone)]
pub(crate) struct CashPosting {
    pub kind: CashMovementKind,
    pub session_id: Option<Uuid>,
    pub transfer_id: Option<Uuid>,
    pub operator: Uuid,
    pub notes: Option<String>,
    pub at: DateTimeWithTimeZone,
}

/// Writes the CashMovement and CashBalanceSnapshot for one side of a balance change.
pub(crate) async fn record<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
    side: SidePlan,
    posting: CashPosting,
) -> Result<cash_movements::Model, DbErr> {
    let movement = cash_movements::ActiveModel {
        id: Set(CashMovementId::new().into_inner()),
        account_id: Set(account_id),
        kind: Set(posting.kind.into()),
        amount: Set(side.delta()),
        balance_before: Set(side.pre),
        balance_after: Set(side.post),
        session_id: Set(posting.session_id),
        transfer_id: Set(posting.transfer_id),
        operator_id: Set(posting.operator),
        notes: Set(posting.notes.clone()),
        created_at: Set(posting.at),
    }
    .insert(conn)
    .await?;

    cash_balance_snapshots::ActiveModel {
        id: Set(CashSnapshotId::new().into_inner()),
        account_id: Set(account_id),
        balance_before: Set(side.pre),
        balance_after: Set(side.post),
        cause: Set(posting.kind.into()),
        cash_movement_id: Set(movement.id),
        operator_id: Set(posting.operator),
        notes: Set(posting.notes),
        created_at: Set(posting.at),
    }
    .insert(conn)
    .await?;

    Ok(movement)
}

/// The configured agency cash account, locked for update where supported.
pub(crate) async fn agency_cash_account<C: ConnectionTrait>(
    conn: &C,
    settings: &LedgerSettings,
) -> Result<financial_accounts::Model, StoreError> {
    let query = financial_accounts::Entity::find()
        .filter(financial_accounts::Column::Name.eq(&settings.cash_account_name));
    for_update(query, conn)
        .one(conn)
        .await?
        .ok_or_else(|| TransferError::CashAccountMissing(settings.cash_account_name.clone()).into())
}

/// Cash movements of an account in posting order.
pub(crate) async fn history<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> Result<Vec<cash_movements::Model>, DbErr> {
    cash_movements::Entity::find()
        .filter(cash_movements::Column::AccountId.eq(account_id))
        .order_by_asc(cash_movements::Column::CreatedAt)
        .order_by_asc(cash_movements::Column::Id)
        .all(conn)
        .await
}

/// Whether an account already has cash movements.
pub(crate) async fn has_history<C: ConnectionTrait>(conn: &C, account_id: Uuid) -> Result<bool, DbErr> {
    let count = cash_movements::Entity::find()
        .filter(cash_movements::Column::AccountId.eq(account_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}
