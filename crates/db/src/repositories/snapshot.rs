//! Periodic balance snapshots.

use chrono::Utc;
use distinta_core::audit::{AuditAction, AuditEntry, EntityKind, EntityRef};
use distinta_core::reconciliation::{LiquidityTrend, SnapshotTotals};
use distinta_shared::types::{PageRequest, PageResponse, SnapshotId, UserId};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::info;

use super::audit;
use crate::entities::{balance_snapshots, financial_accounts};
use crate::error::StoreError;
use crate::store::StoreHandle;

/// Balance snapshot repository for one store.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    store: StoreHandle,
}

impl SnapshotRepository {
    /// Creates a new snapshot repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Records the current totals per account kind and the change in net position.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn take(
        &self,
        operator: UserId,
        notes: Option<String>,
    ) -> Result<balance_snapshots::Model, StoreError> {
        let txn = self.store.conn().begin().await?;

        let totals = SnapshotTotals::from_accounts(
            financial_accounts::Entity::find()
                .all(&txn)
                .await?
                .into_iter()
                .map(|a| (a.kind.into(), a.balance)),
        );
        let previous_net = balance_snapshots::Entity::find()
            .order_by_desc(balance_snapshots::Column::TakenAt)
            .order_by_desc(balance_snapshots::Column::Id)
            .one(&txn)
            .await?
            .map(|s| s.net_position);
        let net_position = totals.net_position();
        let delta = previous_net.map_or(Decimal::ZERO, |prev| net_position - prev);
        let trend = LiquidityTrend::from_delta(delta);

        let taken_at: DateTimeWithTimeZone = Utc::now().into();
        let snapshot = balance_snapshots::ActiveModel {
            id: Set(SnapshotId::new().into_inner()),
            taken_at: Set(taken_at),
            cash: Set(totals.cash),
            bank: Set(totals.bank),
            online: Set(totals.online),
            customers: Set(totals.customers),
            agents: Set(totals.agents),
            expenses: Set(totals.expenses),
            revenue: Set(totals.revenue),
            owner_withdrawals: Set(totals.owner_withdrawals),
            owner_deposits: Set(totals.owner_deposits),
            total_liquidity: Set(totals.total_liquidity()),
            total_assets: Set(totals.total_assets()),
            total_liabilities: Set(totals.total_liabilities()),
            net_position: Set(net_position),
            delta_previous: Set(delta),
            trend: Set(trend.into()),
            operator_id: Set(operator.into_inner()),
            notes: Set(notes),
        }
        .insert(&txn)
        .await?;

        audit::append(
            &txn,
            AuditEntry::new(
                operator.into_inner(),
                AuditAction::Create,
                EntityRef::new(EntityKind::BalanceSnapshot, snapshot.id),
                None,
            )
            .with_snapshots(None, serde_json::to_value(&snapshot).ok()),
        )
        .await?;

        txn.commit().await?;
        info!(
            store = self.store.label(),
            snapshot_id = %snapshot.id,
            %net_position,
            %delta,
            %trend,
            "balance snapshot taken"
        );
        Ok(snapshot)
    }

    /// Lists snapshots, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<balance_snapshots::Model>, StoreError> {
        let query = balance_snapshots::Entity::find()
            .order_by_desc(balance_snapshots::Column::TakenAt)
            .order_by_desc(balance_snapshots::Column::Id);
        let total = query.clone().count(self.store.conn()).await?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(self.store.conn())
            .await?;
        Ok(PageResponse::new(rows, page, total))
    }
}
