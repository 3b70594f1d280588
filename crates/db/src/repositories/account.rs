//! Financial account repository.

use chrono::Utc;
use distinta_core::audit::{AuditAction, AuditEntry, EntityKind, EntityRef};
use distinta_core::movement::BalanceService;
use distinta_core::transfer::{AccountCategory, AccountKind, DEFAULT_ACCOUNTS, TransferError};
use distinta_shared::types::{AccountId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use validator::Validate;

use super::audit;
use super::transfer::{PostingContext, adjust_balance};
use crate::entities::{account_transfers, customers, financial_accounts, sea_orm_active_enums};
use crate::error::StoreError;
use crate::store::{StoreHandle, for_update};

/// Input for creating a financial account.
#[derive(Debug, Clone, Validate)]
pub struct CreateAccountInput {
    /// Unique name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Account kind.
    pub kind: AccountKind,
    /// Category; defaults from the kind.
    pub category: Option<AccountCategory>,
    /// Whether movements are taxable.
    pub taxable: bool,
    /// Description.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

async fn insert_account<C: ConnectionTrait>(
    conn: &C,
    input: CreateAccountInput,
    actor: UserId,
) -> Result<financial_accounts::Model, StoreError> {
    let taken = financial_accounts::Entity::find()
        .filter(financial_accounts::Column::Name.eq(&input.name))
        .count(conn)
        .await?;
    if taken > 0 {
        return Err(TransferError::DuplicateName(input.name).into());
    }

    let now = Utc::now().into();
    let category = input.category.unwrap_or_else(|| input.kind.default_category());
    let account = financial_accounts::ActiveModel {
        id: Set(AccountId::new().into_inner()),
        name: Set(input.name),
        kind: Set(input.kind.into()),
        category: Set(category.into()),
        balance: Set(Decimal::ZERO),
        taxable: Set(input.taxable),
        description: Set(input.description),
        created_by: Set(Some(actor.into_inner())),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    audit::append(
        conn,
        AuditEntry::new(
            actor.into_inner(),
            AuditAction::Create,
            EntityRef::new(EntityKind::FinancialAccount, account.id),
            None,
        )
        .with_snapshots(None, serde_json::to_value(&account).ok()),
    )
    .await?;
    Ok(account)
}

/// Financial account repository for one store.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    store: StoreHandle,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Creates an account with a zero balance. Balances only move through transfers.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if the name is taken.
    pub async fn create(
        &self,
        input: CreateAccountInput,
        actor: UserId,
    ) -> Result<financial_accounts::Model, StoreError> {
        input.validate()?;
        let txn = self.store.conn().begin().await?;
        let account = insert_account(&txn, input, actor).await?;
        txn.commit().await?;
        Ok(account)
    }

    /// Creates the default accounts that do not exist yet. Returns the ones created.
    ///
    /// # Errors
    ///
    /// Returns an error if an insert fails.
    pub async fn seed_defaults(
        &self,
        actor: UserId,
    ) -> Result<Vec<financial_accounts::Model>, StoreError> {
        let txn = self.store.conn().begin().await?;
        let mut created = Vec::new();

        for default in &DEFAULT_ACCOUNTS {
            let exists = financial_accounts::Entity::find()
                .filter(financial_accounts::Column::Name.eq(default.name))
                .count(&txn)
                .await?
                > 0;
            if exists {
                continue;
            }
            let input = CreateAccountInput {
                name: default.name.to_string(),
                kind: default.kind,
                category: None,
                taxable: false,
                description: Some(default.description.to_string()),
            };
            created.push(insert_account(&txn, input, actor).await?);
        }

        txn.commit().await?;
        info!(store = self.store.label(), created = created.len(), "default accounts seeded");
        Ok(created)
    }

    /// Deletes an account that no transfer references.
    ///
    /// # Errors
    ///
    /// Returns `Integrity` while transfers reference the account.
    pub async fn delete(&self, id: AccountId, actor: UserId) -> Result<(), StoreError> {
        let txn = self.store.conn().begin().await?;

        let account = financial_accounts::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::FinancialAccount, id))?;
        let references = account_transfers::Entity::find()
            .filter(
                Condition::any()
                    .add(account_transfers::Column::SourceAccountId.eq(account.id))
                    .add(account_transfers::Column::DestinationAccountId.eq(account.id)),
            )
            .count(&txn)
            .await?;
        if references > 0 {
            return Err(StoreError::Integrity(format!(
                "account '{}' is referenced by {references} transfers",
                account.name
            )));
        }

        financial_accounts::Entity::delete_by_id(account.id)
            .exec(&txn)
            .await?;
        audit::append(
            &txn,
            AuditEntry::new(
                actor.into_inner(),
                AuditAction::Delete,
                EntityRef::new(EntityKind::FinancialAccount, account.id),
                None,
            )
            .with_snapshots(serde_json::to_value(&account).ok(), None),
        )
        .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Gets an account by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is none.
    pub async fn get(&self, id: AccountId) -> Result<financial_accounts::Model, StoreError> {
        financial_accounts::Entity::find_by_id(id.into_inner())
            .one(self.store.conn())
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::FinancialAccount, id))
    }

    /// Finds an account by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<financial_accounts::Model>, StoreError> {
        Ok(financial_accounts::Entity::find()
            .filter(financial_accounts::Column::Name.eq(name))
            .one(self.store.conn())
            .await?)
    }

    /// All accounts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> Result<Vec<financial_accounts::Model>, StoreError> {
        Ok(financial_accounts::Entity::find()
            .order_by_asc(financial_accounts::Column::Name)
            .all(self.store.conn())
            .await?)
    }

    /// Sets the customer-credits account to `-(sum of customer balances)`.
    ///
    /// Returns the adjustment, or `None` when the account already matched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the store has no customer-credits account.
    pub async fn sync_customer_credit_account(
        &self,
        operator: UserId,
    ) -> Result<Option<account_transfers::Model>, StoreError> {
        let txn = self.store.conn().begin().await?;

        let account = for_update(
            financial_accounts::Entity::find()
                .filter(
                    financial_accounts::Column::Kind
                        .eq(sea_orm_active_enums::AccountKind::CustomerCredits),
                )
                .order_by_asc(financial_accounts::Column::CreatedAt),
            &txn,
        )
        .one(&txn)
        .await?
        .ok_or(TransferError::KindMissing("customer_credits"))?;

        let balances = customers::Entity::find().all(&txn).await?;
        let receivable = BalanceService::receivable(balances.iter().map(|c| c.balance));
        if receivable == account.balance {
            return Ok(None);
        }

        let ctx = PostingContext::new(
            operator.into_inner(),
            Some("Allineamento saldo clienti".to_string()),
        );
        let transfer = adjust_balance(&txn, &account, receivable, &ctx).await?;
        audit::append(
            &txn,
            AuditEntry::new(
                ctx.operator,
                AuditAction::Update,
                EntityRef::new(EntityKind::FinancialAccount, account.id),
                ctx.notes.clone(),
            )
            .with_snapshots(
                Some(serde_json::json!({ "balance": account.balance })),
                Some(serde_json::json!({ "balance": receivable })),
            ),
        )
        .await?;

        txn.commit().await?;
        info!(store = self.store.label(), %receivable, "customer credit account synchronized");
        Ok(Some(transfer))
    }
}
