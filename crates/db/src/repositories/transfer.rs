//! Account Transfer Engine persistence.
//!
//! Every balance change of a financial account goes through [`apply_plan`], which writes
//! the AccountTransfer row and, for cash accounts, the cash trail.

use chrono::Utc;
use distinta_core::audit::{AuditAction, AuditEntry, EntityKind, EntityRef};
use distinta_core::transfer::{CashMovementKind, SidePlan, TransferError, TransferPlan, TransferService};
use distinta_shared::types::{AccountId, TransferId, UserId};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm::sea_query::Condition;
use tracing::info;
use uuid::Uuid;

use super::{audit, cash_ledger};
use super::cash_ledger::CashPosting;
use crate::entities::{account_transfers, cash_movements, financial_accounts};
use crate::error::StoreError;
use crate::store::{StoreHandle, for_update};

/// Context shared by the rows a transfer writes.
#[derive(Debug, Clone)]
pub(crate) struct PostingContext {
    pub operator: Uuid,
    pub notes: Option<String>,
    pub at: DateTimeWithTimeZone,
    pub session_id: Option<Uuid>,
    /// Overrides the cash movement kind derived from the transfer kind.
    pub cash_kind: Option<CashMovementKind>,
}

impl PostingContext {
    pub(crate) fn new(operator: Uuid, notes: Option<String>) -> Self {
        Self {
            operator,
            notes,
            at: Utc::now().into(),
            session_id: None,
            cash_kind: None,
        }
    }
}

async fn set_balance<C: ConnectionTrait>(
    conn: &C,
    account: &financial_accounts::Model,
    balance: Decimal,
    at: DateTimeWithTimeZone,
) -> Result<(), StoreError> {
    let mut active: financial_accounts::ActiveModel = account.clone().into();
    active.balance = Set(balance);
    active.updated_at = Set(at);
    active.update(conn).await?;
    Ok(())
}

/// Applies a transfer plan: account balances, the transfer row, and the cash trail.
pub(crate) async fn apply_plan<C: ConnectionTrait>(
    conn: &C,
    plan: &TransferPlan,
    source: Option<&financial_accounts::Model>,
    destination: Option<&financial_accounts::Model>,
    ctx: &PostingContext,
) -> Result<account_transfers::Model, StoreError> {
    let sides = [
        (source, plan.source, "source"),
        (destination, plan.destination, "destination"),
    ];
    for (account, side, label) in &sides {
        match (account, side) {
            (Some(account), Some(side)) => set_balance(conn, account, side.post, ctx.at).await?,
            (None, Some(_)) => return Err(TransferError::MissingSide(*label).into()),
            _ => {}
        }
    }

    let transfer = account_transfers::ActiveModel {
        id: Set(TransferId::new().into_inner()),
        kind: Set(plan.kind.into()),
        amount: Set(plan.amount),
        source_account_id: Set(source.map(|a| a.id)),
        destination_account_id: Set(destination.map(|a| a.id)),
        source_pre: Set(plan.source.map(|s| s.pre)),
        source_post: Set(plan.source.map(|s| s.post)),
        destination_pre: Set(plan.destination.map(|d| d.pre)),
        destination_post: Set(plan.destination.map(|d| d.post)),
        operator_id: Set(ctx.operator),
        notes: Set(ctx.notes.clone()),
        created_at: Set(ctx.at),
    }
    .insert(conn)
    .await?;

    for (account, side, label) in sides {
        let (Some(account), Some(side)) = (account, side) else {
            continue;
        };
        if account.is_cash() {
            let kind = match ctx.cash_kind {
                Some(kind) => kind,
                None => {
                    let first_posting = !cash_ledger::has_history(conn, account.id).await?;
                    CashMovementKind::for_posting(plan.kind, label == "source", first_posting)
                }
            };
            cash_ledger::record(
                conn,
                account.id,
                side,
                CashPosting {
                    kind,
                    session_id: ctx.session_id,
                    transfer_id: Some(transfer.id),
                    operator: ctx.operator,
                    notes: ctx.notes.clone(),
                    at: ctx.at,
                },
            )
            .await?;
        }
    }

    Ok(transfer)
}

/// Sets `account` to `new_balance` through a direct adjustment.
pub(crate) async fn adjust_balance<C: ConnectionTrait>(
    conn: &C,
    account: &financial_accounts::Model,
    new_balance: Decimal,
    ctx: &PostingContext,
) -> Result<account_transfers::Model, StoreError> {
    let plan = TransferService::direct_adjustment(account.balance, new_balance);
    let (source, destination) = if plan.source.is_some() {
        (Some(account), None)
    } else {
        (None, Some(account))
    };
    apply_plan(conn, &plan, source, destination, ctx).await
}

async fn load_account<C: ConnectionTrait>(
    conn: &C,
    id: AccountId,
) -> Result<financial_accounts::Model, StoreError> {
    for_update(financial_accounts::Entity::find_by_id(id.into_inner()), conn)
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::not_found(EntityKind::FinancialAccount, id))
}

/// Locks two distinct accounts in id order and returns them as `(first, second)`.
async fn load_pair<C: ConnectionTrait>(
    conn: &C,
    first: AccountId,
    second: AccountId,
) -> Result<(financial_accounts::Model, financial_accounts::Model), StoreError> {
    if first.into_inner() < second.into_inner() {
        let a = load_account(conn, first).await?;
        let b = load_account(conn, second).await?;
        Ok((a, b))
    } else {
        let b = load_account(conn, second).await?;
        let a = load_account(conn, first).await?;
        Ok((a, b))
    }
}

fn audit_entry(
    operator: Uuid,
    action: AuditAction,
    transfer: &account_transfers::Model,
    deleted: bool,
) -> AuditEntry {
    let snapshot = serde_json::to_value(transfer).ok();
    let (before, after) = if deleted { (snapshot, None) } else { (None, snapshot) };
    AuditEntry::new(
        operator,
        action,
        EntityRef::new(EntityKind::AccountTransfer, transfer.id),
        transfer.notes.clone(),
    )
    .with_snapshots(before, after)
}

/// Transfer repository for one store.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    store: StoreHandle,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Moves `amount` from `source` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for `amount <= 0`, `SameAccount` when both sides match,
    /// or `NotFound` for an unknown account.
    pub async fn transfer(
        &self,
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        operator: UserId,
        notes: Option<String>,
    ) -> Result<account_transfers::Model, StoreError> {
        if source == destination {
            return Err(TransferError::SameAccount(source.into_inner()).into());
        }
        let txn = self.store.conn().begin().await?;

        let (src, dst) = load_pair(&txn, source, destination).await?;
        let plan = TransferService::transfer(src.balance, dst.balance, amount)?;
        let ctx = PostingContext::new(operator.into_inner(), notes);
        let transfer = apply_plan(&txn, &plan, Some(&src), Some(&dst), &ctx).await?;
        audit::append(&txn, audit_entry(ctx.operator, AuditAction::Create, &transfer, false)).await?;

        txn.commit().await?;
        info!(
            store = self.store.label(),
            transfer_id = %transfer.id,
            source = %src.name,
            destination = %dst.name,
            %amount,
            "transfer recorded"
        );
        Ok(transfer)
    }

    /// Money entering `account` from outside the ledger.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for `amount <= 0` or `NotFound` for an unknown account.
    pub async fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        operator: UserId,
        notes: Option<String>,
    ) -> Result<account_transfers::Model, StoreError> {
        let txn = self.store.conn().begin().await?;

        let target = load_account(&txn, account).await?;
        let plan = TransferService::deposit(target.balance, amount)?;
        let ctx = PostingContext::new(operator.into_inner(), notes);
        let transfer = apply_plan(&txn, &plan, None, Some(&target), &ctx).await?;
        audit::append(&txn, audit_entry(ctx.operator, AuditAction::Create, &transfer, false)).await?;

        txn.commit().await?;
        info!(store = self.store.label(), transfer_id = %transfer.id, account = %target.name, %amount, "deposit recorded");
        Ok(transfer)
    }

    /// Money leaving `account` for outside the ledger.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for `amount <= 0` or `NotFound` for an unknown account.
    pub async fn withdraw(
        &self,
        account: AccountId,
        amount: Decimal,
        operator: UserId,
        notes: Option<String>,
    ) -> Result<account_transfers::Model, StoreError> {
        let txn = self.store.conn().begin().await?;

        let target = load_account(&txn, account).await?;
        let plan = TransferService::withdraw(target.balance, amount)?;
        let ctx = PostingContext::new(operator.into_inner(), notes);
        let transfer = apply_plan(&txn, &plan, Some(&target), None, &ctx).await?;
        audit::append(&txn, audit_entry(ctx.operator, AuditAction::Create, &transfer, false)).await?;

        txn.commit().await?;
        info!(store = self.store.label(), transfer_id = %transfer.id, account = %target.name, %amount, "withdrawal recorded");
        Ok(transfer)
    }

    /// Sets `account` to `new_balance`, logging the change as a direct adjustment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account.
    pub async fn direct_adjust(
        &self,
        account: AccountId,
        new_balance: Decimal,
        operator: UserId,
        notes: Option<String>,
    ) -> Result<account_transfers::Model, StoreError> {
        let txn = self.store.conn().begin().await?;

        let target = load_account(&txn, account).await?;
        let ctx = PostingContext::new(operator.into_inner(), notes);
        let transfer = adjust_balance(&txn, &target, new_balance, &ctx).await?;
        audit::append(&txn, audit_entry(ctx.operator, AuditAction::Create, &transfer, false)).await?;

        txn.commit().await?;
        info!(
            store = self.store.label(),
            transfer_id = %transfer.id,
            account = %target.name,
            old = %target.balance,
            new = %new_balance,
            "direct adjustment recorded"
        );
        Ok(transfer)
    }

    /// Deletes a transfer and restores every touched account to its recorded `pre` value.
    ///
    /// Cash accounts get a `correction` cash movement; the cash movements that referenced
    /// the transfer stay in the trail with the link cleared.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown transfer.
    pub async fn delete_transfer(&self, id: TransferId, operator: UserId) -> Result<(), StoreError> {
        let txn = self.store.conn().begin().await?;

        let transfer = account_transfers::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::AccountTransfer, id))?;
        let (source_pre, destination_pre) =
            TransferService::restore(transfer.source_side(), transfer.destination_side());
        let at: DateTimeWithTimeZone = Utc::now().into();
        let note = format!("Annullamento movimento conti #{}", transfer.id);

        let mut restores: Vec<(Uuid, Decimal)> = [
            (transfer.source_account_id, source_pre),
            (transfer.destination_account_id, destination_pre),
        ]
        .into_iter()
        .filter_map(|(account_id, restored)| account_id.zip(restored))
        .collect();
        // Same lock order as `transfer`.
        restores.sort_by_key(|(account_id, _)| *account_id);

        for (account_id, restored) in restores {
            let account = load_account(&txn, AccountId::from_uuid(account_id)).await?;
            set_balance(&txn, &account, restored, at).await?;
            if account.is_cash() {
                cash_ledger::record(
                    &txn,
                    account.id,
                    SidePlan {
                        pre: account.balance,
                        post: restored,
                    },
                    CashPosting {
                        kind: CashMovementKind::Correction,
                        session_id: None,
                        transfer_id: None,
                        operator: operator.into_inner(),
                        notes: Some(note.clone()),
                        at,
                    },
                )
                .await?;
            }
        }

        cash_movements::Entity::update_many()
            .col_expr(
                cash_movements::Column::TransferId,
                sea_orm::sea_query::Expr::value(Option::<Uuid>::None),
            )
            .filter(cash_movements::Column::TransferId.eq(transfer.id))
            .exec(&txn)
            .await?;
        account_transfers::Entity::delete_by_id(transfer.id).exec(&txn).await?;
        audit::append(&txn, audit_entry(operator.into_inner(), AuditAction::Delete, &transfer, true)).await?;

        txn.commit().await?;
        info!(store = self.store.label(), transfer_id = %transfer.id, "transfer deleted and balances restored");
        Ok(())
    }

    /// Finds a transfer by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find(&self, id: TransferId) -> Result<Option<account_transfers::Model>, StoreError> {
        Ok(account_transfers::Entity::find_by_id(id.into_inner())
            .one(self.store.conn())
            .await?)
    }

    /// Transfers touching an account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<account_transfers::Model>, StoreError> {
        let id = account.into_inner();
        Ok(account_transfers::Entity::find()
            .filter(
                Condition::any()
                    .add(account_transfers::Column::SourceAccountId.eq(id))
                    .add(account_transfers::Column::DestinationAccountId.eq(id)),
            )
            .order_by_asc(account_transfers::Column::CreatedAt)
            .order_by_asc(account_transfers::Column::Id)
            .all(self.store.conn())
            .await?)
    }
}
