//! Customer repository and Balance Engine persistence.
//!
//! `customers.balance` is a cache of the unsettled movement sum. It is written only by
//! [`recompute_balance`], which orchestration code calls after every movement mutation.

use chrono::{DateTime, Duration, Utc};
use distinta_core::audit::{AuditAction, AuditEntry, EntityKind, EntityRef};
use distinta_core::movement::{BalanceService, RiskRating, RunningBalance};
use distinta_shared::types::{CustomerId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::audit;
use crate::entities::{customers, movements, notices};
use crate::error::StoreError;
use crate::store::StoreHandle;

/// Input for creating a customer.
#[derive(Debug, Clone, Validate)]
pub struct CreateCustomerInput {
    /// First name.
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    /// Last name.
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// Email.
    #[validate(email)]
    pub email: Option<String>,
    /// Phone.
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    /// Credit the agency extends to this customer.
    pub credit_limit: Decimal,
    /// Risk rating.
    pub risk_rating: RiskRating,
    /// Notes.
    pub notes: Option<String>,
}

impl CreateCustomerInput {
    /// A customer with the default limit (0) and rating (C).
    #[must_use]
    pub fn named(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            phone: None,
            credit_limit: Decimal::ZERO,
            risk_rating: RiskRating::default(),
            notes: None,
        }
    }
}

/// Fields that may change on a customer. The balance is not one of them.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateCustomerInput {
    /// First name.
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    /// Last name.
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    /// Email; `Some(None)` clears it.
    pub email: Option<Option<String>>,
    /// Phone; `Some(None)` clears it.
    pub phone: Option<Option<String>>,
    /// Credit limit.
    pub credit_limit: Option<Decimal>,
    /// Risk rating.
    pub risk_rating: Option<RiskRating>,
    /// Notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
}

/// One line of a customer statement.
#[derive(Debug, Clone)]
pub struct StatementLine {
    /// The movement.
    pub movement: movements::Model,
    /// Running balance after it.
    pub running: RunningBalance,
}

/// A customer owing money with no recent unsettled activity.
#[derive(Debug, Clone)]
pub struct OverdueCustomer {
    /// The customer.
    pub customer: customers::Model,
    /// Most recent unsettled movement.
    pub last_unsettled_at: DateTime<Utc>,
}

/// Sets `customers.balance` to the sum of the customer's unsettled movement amounts.
///
/// Runs on the caller's connection or transaction, so it sees uncommitted movement writes.
pub(crate) async fn recompute_balance<C: ConnectionTrait>(
    conn: &C,
    customer: Uuid,
) -> Result<Decimal, StoreError> {
    let unsettled = movements::Entity::find()
        .filter(movements::Column::CustomerId.eq(customer))
        .filter(movements::Column::Settled.eq(false))
        .all(conn)
        .await?;
    let balance = BalanceService::unsettled_total(unsettled.iter().map(|m| (m.amount, m.settled)));

    let result = customers::Entity::update_many()
        .col_expr(customers::Column::Balance, Expr::value(balance))
        .filter(customers::Column::Id.eq(customer))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(StoreError::not_found(EntityKind::Customer, customer));
    }
    Ok(balance)
}

fn validate_credit_limit(limit: Decimal) -> Result<(), StoreError> {
    if limit < Decimal::ZERO {
        return Err(distinta_core::movement::MovementError::NegativeCreditLimit.into());
    }
    Ok(())
}

/// Customer repository for one store.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    store: StoreHandle,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Creates a customer with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad fields or a negative credit limit.
    pub async fn create(
        &self,
        input: CreateCustomerInput,
        actor: UserId,
    ) -> Result<customers::Model, StoreError> {
        input.validate()?;
        validate_credit_limit(input.credit_limit)?;

        let txn = self.store.conn().begin().await?;
        let now = Utc::now().into();
        let customer = customers::ActiveModel {
            id: Set(CustomerId::new().into_inner()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            balance: Set(Decimal::ZERO),
            credit_limit: Set(input.credit_limit),
            risk_rating: Set(input.risk_rating.into()),
            notes: Set(input.notes),
            created_by: Set(Some(actor.into_inner())),
            modified_by: Set(Some(actor.into_inner())),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        audit::append(
            &txn,
            AuditEntry::new(
                actor.into_inner(),
                AuditAction::Create,
                EntityRef::new(EntityKind::Customer, customer.id),
                None,
            )
            .with_snapshots(None, serde_json::to_value(&customer).ok()),
        )
        .await?;
        txn.commit().await?;
        Ok(customer)
    }

    /// Updates descriptive fields and the credit terms.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown customer.
    pub async fn update(
        &self,
        id: CustomerId,
        input: UpdateCustomerInput,
        actor: UserId,
    ) -> Result<customers::Model, StoreError> {
        input.validate()?;
        if let Some(limit) = input.credit_limit {
            validate_credit_limit(limit)?;
        }

        let txn = self.store.conn().begin().await?;
        let before = customers::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Customer, id))?;

        let mut active: customers::ActiveModel = before.clone().into();
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(limit) = input.credit_limit {
            active.credit_limit = Set(limit);
        }
        if let Some(rating) = input.risk_rating {
            active.risk_rating = Set(rating.into());
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.modified_by = Set(Some(actor.into_inner()));
        active.updated_at = Set(Utc::now().into());
        let after = active.update(&txn).await?;

        audit::append(
            &txn,
            AuditEntry::new(
                actor.into_inner(),
                AuditAction::Update,
                EntityRef::new(EntityKind::Customer, after.id),
                None,
            )
            .with_snapshots(
                serde_json::to_value(&before).ok(),
                serde_json::to_value(&after).ok(),
            ),
        )
        .await?;
        txn.commit().await?;
        Ok(after)
    }

    /// Deletes a customer with no movements.
    ///
    /// # Errors
    ///
    /// Returns `Integrity` while movements exist.
    pub async fn delete(&self, id: CustomerId, actor: UserId) -> Result<(), StoreError> {
        let txn = self.store.conn().begin().await?;
        let customer = customers::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Customer, id))?;

        let owned = movements::Entity::find()
            .filter(movements::Column::CustomerId.eq(customer.id))
            .count(&txn)
            .await?;
        if owned > 0 {
            return Err(StoreError::Integrity(format!(
                "customer {} has {owned} movements",
                customer.id
            )));
        }

        notices::Entity::delete_many()
            .filter(notices::Column::CustomerId.eq(customer.id))
            .exec(&txn)
            .await?;
        customers::Entity::delete_by_id(customer.id).exec(&txn).await?;
        audit::append(
            &txn,
            AuditEntry::new(
                actor.into_inner(),
                AuditAction::Delete,
                EntityRef::new(EntityKind::Customer, customer.id),
                None,
            )
            .with_snapshots(serde_json::to_value(&customer).ok(), None),
        )
        .await?;
        txn.commit().await?;
        Ok(())
    }

    /// Finds a customer by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find(&self, id: CustomerId) -> Result<Option<customers::Model>, StoreError> {
        Ok(customers::Entity::find_by_id(id.into_inner())
            .one(self.store.conn())
            .await?)
    }

    /// Gets a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is none.
    pub async fn get(&self, id: CustomerId) -> Result<customers::Model, StoreError> {
        self.find(id)
            .await?
            .ok_or_else(|| StoreError::not_found(EntityKind::Customer, id))
    }

    /// Recomputes one customer's cached balance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown customer.
    pub async fn recompute_balance(&self, id: CustomerId) -> Result<Decimal, StoreError> {
        let txn = self.store.conn().begin().await?;
        let balance = recompute_balance(&txn, id.into_inner()).await?;
        txn.commit().await?;
        Ok(balance)
    }

    /// Recomputes every customer's balance in one transaction.
    ///
    /// Returns how many cached balances were wrong.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn recompute_all(&self) -> Result<usize, StoreError> {
        let txn = self.store.conn().begin().await?;
        let all = customers::Entity::find().all(&txn).await?;
        let mut changed = 0;
        for customer in &all {
            if recompute_balance(&txn, customer.id).await? != customer.balance {
                changed += 1;
            }
        }
        txn.commit().await?;
        info!(store = self.store.label(), customers = all.len(), changed, "customer balances rebuilt");
        Ok(changed)
    }

    /// Customers whose debt exceeds their credit limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn over_limit(&self) -> Result<Vec<customers::Model>, StoreError> {
        let debtors = customers::Entity::find()
            .filter(customers::Column::Balance.lt(Decimal::ZERO))
            .order_by_asc(customers::Column::LastName)
            .order_by_asc(customers::Column::FirstName)
            .all(self.store.conn())
            .await?;
        Ok(debtors
            .into_iter()
            .filter(|c| c.credit_view().is_over_limit())
            .collect())
    }

    /// Customers owing money whose latest unsettled movement is older than `days`.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn overdue(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<OverdueCustomer>, StoreError> {
        let cutoff = now - Duration::days(i64::from(days));
        let debtors = customers::Entity::find()
            .filter(customers::Column::Balance.lt(Decimal::ZERO))
            .order_by_asc(customers::Column::LastName)
            .all(self.store.conn())
            .await?;

        let mut overdue = Vec::new();
        for customer in debtors {
            let latest = movements::Entity::find()
                .filter(movements::Column::CustomerId.eq(customer.id))
                .filter(movements::Column::Settled.eq(false))
                .all(self.store.conn())
                .await?
                .into_iter()
                .map(|m| m.occurred_at.with_timezone(&Utc))
                .max();
            if let Some(last_unsettled_at) = latest.filter(|at| *at < cutoff) {
                overdue.push(OverdueCustomer {
                    customer,
                    last_unsettled_at,
                });
            }
        }
        Ok(overdue)
    }

    /// Chronological statement with running balances over every movement.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown customer.
    pub async fn statement(&self, id: CustomerId) -> Result<Vec<StatementLine>, StoreError> {
        let customer = self.get(id).await?;
        let mut log = movements::Entity::find()
            .filter(movements::Column::CustomerId.eq(customer.id))
            .all(self.store.conn())
            .await?;
        log.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));

        let running = BalanceService::running_balances(log.iter().map(|m| m.amount));
        Ok(log
            .into_iter()
            .zip(running)
            .map(|(movement, running)| StatementLine { movement, running })
            .collect())
    }
}
