//! Reconciliation Engine persistence.

use chrono::{DateTime, FixedOffset, Utc};
use distinta_core::audit::{AuditAction, AuditEntry, EntityKind, EntityRef};
use distinta_core::reconciliation::{CheckFigures, PeriodTotals, ReconciliationService};
use distinta_core::transfer::AccountCategory;
use distinta_shared::types::{CheckId, PageRequest, PageResponse, UserId};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::audit;
use super::cash_ledger::{agency_cash_account, history};
use crate::entities::{financial_accounts, reconciliation_checks};
use crate::error::StoreError;
use crate::store::StoreHandle;

struct CheckRow {
    account_id: Option<Uuid>,
    category: Option<AccountCategory>,
    period_start: DateTimeWithTimeZone,
    period_end: DateTimeWithTimeZone,
    opening: Decimal,
    observed: Decimal,
    figures: CheckFigures,
    totals: PeriodTotals,
    operator: Uuid,
    notes: Option<String>,
}

async fn insert_check<C: ConnectionTrait>(
    conn: &C,
    row: CheckRow,
) -> Result<reconciliation_checks::Model, StoreError> {
    let check = reconciliation_checks::ActiveModel {
        id: Set(CheckId::new().into_inner()),
        account_id: Set(row.account_id),
        category: Set(row.category.map(Into::into)),
        period_start: Set(row.period_start),
        period_end: Set(row.period_end),
        opening_balance: Set(row.opening),
        closing_real: Set(row.observed),
        closing_calculated: Set(row.figures.calculated_closing),
        difference: Set(row.figures.difference),
        state: Set(row.figures.state.into()),
        total_in: Set(row.totals.inflows),
        total_out: Set(row.totals.outflows),
        movement_count: Set(i64::try_from(row.totals.count).unwrap_or(i64::MAX)),
        operator_id: Set(row.operator),
        notes: Set(row.notes),
        created_at: Set(row.period_end),
    }
    .insert(conn)
    .await?;

    audit::append(
        conn,
        AuditEntry::new(
            row.operator,
            AuditAction::Create,
            EntityRef::new(EntityKind::ReconciliationCheck, check.id),
            None,
        )
        .with_snapshots(None, serde_json::to_value(&check).ok()),
    )
    .await?;
    Ok(check)
}

/// Reconciliation repository for one store.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    store: StoreHandle,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Checks the agency cash account against an observed balance.
    ///
    /// The period starts at `since`, else at the end of the previous cash check, else at the
    /// earliest cash movement. The opening is the previous check's observed closing (0 if
    /// none).
    ///
    /// # Errors
    ///
    /// Returns `CashAccountMissing` if the agency cash account does not exist.
    pub async fn check_cash(
        &self,
        operator: UserId,
        observed: Decimal,
        since: Option<DateTime<FixedOffset>>,
    ) -> Result<reconciliation_checks::Model, StoreError> {
        let txn = self.store.conn().begin().await?;
        let cash = agency_cash_account(&txn, self.store.settings()).await?;

        let previous = reconciliation_checks::Entity::find()
            .filter(reconciliation_checks::Column::AccountId.eq(cash.id))
            .order_by_desc(reconciliation_checks::Column::CreatedAt)
            .order_by_desc(reconciliation_checks::Column::Id)
            .one(&txn)
            .await?;
        let opening = previous.as_ref().map_or(Decimal::ZERO, |p| p.closing_real);

        let now: DateTimeWithTimeZone = Utc::now().into();
        let trail = history(&txn, cash.id).await?;
        let in_period: Vec<_> = trail
            .iter()
            .filter(|m| match (since, &previous) {
                (Some(start), _) => m.created_at >= start,
                (None, Some(prev)) => m.created_at > prev.period_end,
                (None, None) => true,
            })
            .filter(|m| m.created_at <= now)
            .collect();
        let period_start = since
            .or_else(|| previous.as_ref().map(|p| p.period_end))
            .or_else(|| trail.first().map(|m| m.created_at))
            .unwrap_or(now);

        let totals = ReconciliationService::period_totals(in_period.iter().map(|m| m.amount));
        let figures = ReconciliationService::evaluate_cash(opening, &totals, observed);

        let check = insert_check(
            &txn,
            CheckRow {
                account_id: Some(cash.id),
                category: None,
                period_start,
                period_end: now,
                opening,
                observed,
                figures,
                totals,
                operator: operator.into_inner(),
                notes: None,
            },
        )
        .await?;

        txn.commit().await?;
        info!(
            store = self.store.label(),
            check_id = %check.id,
            calculated = %figures.calculated_closing,
            %observed,
            state = %figures.state,
            "cash reconciliation check recorded"
        );
        Ok(check)
    }

    /// Compares observed totals per category with the sum of account balances in it.
    ///
    /// Persists one check per supplied category.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn check_global(
        &self,
        operator: UserId,
        observed_by_category: &[(AccountCategory, Decimal)],
    ) -> Result<Vec<reconciliation_checks::Model>, StoreError> {
        let txn = self.store.conn().begin().await?;
        let balances: Vec<(AccountCategory, Decimal)> = financial_accounts::Entity::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| (a.category.into(), a.balance))
            .collect();

        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut checks = Vec::with_capacity(observed_by_category.len());
        for &(category, observed) in observed_by_category {
            let theoretical =
                ReconciliationService::category_total(category, balances.iter().copied());
            let figures = ReconciliationService::evaluate(theoretical, observed);
            let check = insert_check(
                &txn,
                CheckRow {
                    account_id: None,
                    category: Some(category),
                    period_start: now,
                    period_end: now,
                    opening: theoretical,
                    observed,
                    figures,
                    totals: PeriodTotals::default(),
                    operator: operator.into_inner(),
                    notes: Some(format!("Verifica categoria {category}")),
                },
            )
            .await?;
            info!(
                store = self.store.label(),
                check_id = %check.id,
                %category,
                state = %figures.state,
                "category reconciliation check recorded"
            );
            checks.push(check);
        }

        txn.commit().await?;
        Ok(checks)
    }

    /// Lists checks, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_checks(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<reconciliation_checks::Model>, StoreError> {
        let query = reconciliation_checks::Entity::find()
            .order_by_desc(reconciliation_checks::Column::CreatedAt)
            .order_by_desc(reconciliation_checks::Column::Id);
        let total = query.clone().count(self.store.conn()).await?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(self.store.conn())
            .await?;
        Ok(PageResponse::new(rows, page, total))
    }
}
