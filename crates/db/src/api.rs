//! Programmatic interface of the ledger.
//!
//! Every call takes the store it runs against. Resolve it once per logical operation with
//! [`resolve_store`] and pass the same handle to every call of that operation.

use chrono::{DateTime, FixedOffset, Utc};
use distinta_core::audit::{AuditAction, EntityRef};
use distinta_core::transfer::AccountCategory;
use distinta_shared::types::{
    AccountId, CheckId, CustomerId, LogId, MovementId, NoticeId, PageRequest, PageResponse,
    SessionId, TenantId, TransferId, UserId,
};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::entities::{
    account_transfers, audit_log, balance_snapshots, cash_sessions, customers, financial_accounts,
    movements, notices, reconciliation_checks, tenants,
};
use crate::error::StoreError;
use crate::repositories::{
    AccountRepository, AuditRepository, CloseSessionInput, CreateAccountInput,
    CreateCustomerInput, CreateNoticeInput, CustomerRepository, IdentityRepository,
    MovementRepository, NoticeRepository, OverdueCustomer, ReconciliationRepository,
    RecordMovementInput, RegisterTenantInput, ReplicationOutcome, SessionRepository,
    SessionSummary, SnapshotRepository, StatementLine, TransferRepository, UpdateCustomerInput,
    UpdateMovementInput,
};
use crate::router::{AssignmentReport, TenantRouter};
use crate::store::StoreHandle;

// ---------------------------------------------------------------------------
// Tenant Router
// ---------------------------------------------------------------------------

/// The store a principal's operations run against.
pub async fn resolve_store(router: &TenantRouter, principal: UserId) -> Result<StoreHandle, StoreError> {
    router.resolve_store(principal).await
}

/// Registers an agency in the shared store.
pub async fn register_tenant(
    shared: &StoreHandle,
    input: RegisterTenantInput,
) -> Result<tenants::Model, StoreError> {
    IdentityRepository::new(shared.clone()).register_tenant(input).await
}

/// Links a user to a tenant (or to none) and keeps the identity mirrors in step.
pub async fn assign_profile(
    router: &TenantRouter,
    user: UserId,
    tenant: Option<TenantId>,
) -> Result<AssignmentReport, StoreError> {
    router.assign_profile(user, tenant).await
}

/// Mirrors a principal's identity record into `target`.
pub async fn sync_identity(
    router: &TenantRouter,
    principal: UserId,
    target: &StoreHandle,
) -> Result<ReplicationOutcome, StoreError> {
    router.sync_identity(principal, target).await
}

/// Removes a principal's identity mirror from `target`.
pub async fn remove_identity(
    router: &TenantRouter,
    principal: UserId,
    target: &StoreHandle,
) -> ReplicationOutcome {
    router.remove_identity(principal, target).await
}

// ---------------------------------------------------------------------------
// Customers, movements, settlement
// ---------------------------------------------------------------------------

/// Creates a customer.
pub async fn create_customer(
    store: &StoreHandle,
    input: CreateCustomerInput,
    actor: UserId,
) -> Result<customers::Model, StoreError> {
    CustomerRepository::new(store.clone()).create(input, actor).await
}

/// Updates a customer's descriptive fields and credit limit.
pub async fn update_customer(
    store: &StoreHandle,
    customer: CustomerId,
    input: UpdateCustomerInput,
    actor: UserId,
) -> Result<customers::Model, StoreError> {
    CustomerRepository::new(store.clone())
        .update(customer, input, actor)
        .await
}

/// Deletes a customer without movements.
pub async fn delete_customer(
    store: &StoreHandle,
    customer: CustomerId,
    actor: UserId,
) -> Result<(), StoreError> {
    CustomerRepository::new(store.clone()).delete(customer, actor).await
}

/// Rebuilds a customer's balance from its unsettled movements.
pub async fn recompute_balance(store: &StoreHandle, customer: CustomerId) -> Result<Decimal, StoreError> {
    CustomerRepository::new(store.clone())
        .recompute_balance(customer)
        .await
}

/// Rebuilds every customer balance; returns how many changed.
pub async fn recompute_all_balances(store: &StoreHandle) -> Result<usize, StoreError> {
    CustomerRepository::new(store.clone()).recompute_all().await
}

/// Chronological running balance of all of a customer's movements.
pub async fn rebuild_running_balances(
    store: &StoreHandle,
    customer: CustomerId,
) -> Result<Vec<StatementLine>, StoreError> {
    CustomerRepository::new(store.clone()).statement(customer).await
}

/// Customers whose debt exceeds their credit limit.
pub async fn over_limit_customers(store: &StoreHandle) -> Result<Vec<customers::Model>, StoreError> {
    CustomerRepository::new(store.clone()).over_limit().await
}

/// Debtors whose latest unsettled movement is older than `days`.
///
/// `None` uses the configured default.
pub async fn overdue_customers(
    store: &StoreHandle,
    days: Option<u32>,
) -> Result<Vec<OverdueCustomer>, StoreError> {
    let days = days.unwrap_or(store.settings().overdue_days);
    CustomerRepository::new(store.clone())
        .overdue(days, Utc::now())
        .await
}

/// Records a customer movement.
pub async fn record_movement(
    store: &StoreHandle,
    input: RecordMovementInput,
    operator: UserId,
) -> Result<movements::Model, StoreError> {
    MovementRepository::new(store.clone()).record(input, operator).await
}

/// Edits an unsettled movement.
pub async fn update_movement(
    store: &StoreHandle,
    movement: MovementId,
    input: UpdateMovementInput,
    operator: UserId,
) -> Result<movements::Model, StoreError> {
    MovementRepository::new(store.clone())
        .update(movement, input, operator)
        .await
}

/// Deletes an unsettled movement.
pub async fn delete_movement(
    store: &StoreHandle,
    movement: MovementId,
    operator: UserId,
) -> Result<(), StoreError> {
    MovementRepository::new(store.clone())
        .delete(movement, operator)
        .await
}

/// Settles a movement with a compensating entry.
///
/// Returns `false` without writing anything when the movement is already settled or the
/// operator has no open session.
pub async fn settle(
    store: &StoreHandle,
    movement: MovementId,
    operator: UserId,
) -> Result<bool, StoreError> {
    MovementRepository::new(store.clone())
        .settle(movement, operator)
        .await
}

// ---------------------------------------------------------------------------
// Drawer sessions
// ---------------------------------------------------------------------------

/// Opens a drawer session.
pub async fn open_session(
    store: &StoreHandle,
    operator: UserId,
    opening_cash: Decimal,
    notes: Option<String>,
) -> Result<SessionId, StoreError> {
    let session = SessionRepository::new(store.clone())
        .open(operator, opening_cash, notes)
        .await?;
    Ok(SessionId::from_uuid(session.id))
}

/// Closes a drawer session.
pub async fn close_session(
    store: &StoreHandle,
    session: SessionId,
    operator: UserId,
    input: CloseSessionInput,
) -> Result<cash_sessions::Model, StoreError> {
    SessionRepository::new(store.clone())
        .close(session, operator, input)
        .await
}

/// Verifies a closed drawer session.
pub async fn verify_session(
    store: &StoreHandle,
    session: SessionId,
    verifier: UserId,
) -> Result<cash_sessions::Model, StoreError> {
    SessionRepository::new(store.clone())
        .verify(session, verifier)
        .await
}

/// Reopens a closed drawer session.
pub async fn reopen_session(
    store: &StoreHandle,
    session: SessionId,
    requester: UserId,
) -> Result<cash_sessions::Model, StoreError> {
    SessionRepository::new(store.clone())
        .reopen(session, requester)
        .await
}

/// The operator's open session, if any.
pub async fn open_session_for(
    store: &StoreHandle,
    operator: UserId,
) -> Result<Option<cash_sessions::Model>, StoreError> {
    SessionRepository::new(store.clone())
        .open_session_for(operator)
        .await
}

/// Live totals of a session.
pub async fn session_summary(
    store: &StoreHandle,
    session: SessionId,
    counted_cash: Option<Decimal>,
) -> Result<SessionSummary, StoreError> {
    SessionRepository::new(store.clone())
        .summary(session, counted_cash)
        .await
}

// ---------------------------------------------------------------------------
// Financial accounts and transfers
// ---------------------------------------------------------------------------

/// Creates a financial account.
pub async fn create_account(
    store: &StoreHandle,
    input: CreateAccountInput,
    actor: UserId,
) -> Result<financial_accounts::Model, StoreError> {
    AccountRepository::new(store.clone()).create(input, actor).await
}

/// Creates the default chart of accounts; existing names are left alone.
pub async fn seed_default_accounts(
    store: &StoreHandle,
    actor: UserId,
) -> Result<Vec<financial_accounts::Model>, StoreError> {
    AccountRepository::new(store.clone()).seed_defaults(actor).await
}

/// Deletes an account no transfer references.
pub async fn delete_account(
    store: &StoreHandle,
    account: AccountId,
    actor: UserId,
) -> Result<(), StoreError> {
    AccountRepository::new(store.clone()).delete(account, actor).await
}

/// Moves money between two accounts.
pub async fn transfer(
    store: &StoreHandle,
    source: AccountId,
    destination: AccountId,
    amount: Decimal,
    operator: UserId,
    note: Option<String>,
) -> Result<TransferId, StoreError> {
    let row = TransferRepository::new(store.clone())
        .transfer(source, destination, amount, operator, note)
        .await?;
    Ok(TransferId::from_uuid(row.id))
}

/// Sets an account to `new_balance`.
pub async fn direct_adjust(
    store: &StoreHandle,
    account: AccountId,
    new_balance: Decimal,
    operator: UserId,
    note: Option<String>,
) -> Result<TransferId, StoreError> {
    let row = TransferRepository::new(store.clone())
        .direct_adjust(account, new_balance, operator, note)
        .await?;
    Ok(TransferId::from_uuid(row.id))
}

/// Adds money to one account.
pub async fn deposit(
    store: &StoreHandle,
    account: AccountId,
    amount: Decimal,
    operator: UserId,
    note: Option<String>,
) -> Result<account_transfers::Model, StoreError> {
    TransferRepository::new(store.clone())
        .deposit(account, amount, operator, note)
        .await
}

/// Takes money from one account.
pub async fn withdraw(
    store: &StoreHandle,
    account: AccountId,
    amount: Decimal,
    operator: UserId,
    note: Option<String>,
) -> Result<account_transfers::Model, StoreError> {
    TransferRepository::new(store.clone())
        .withdraw(account, amount, operator, note)
        .await
}

/// Deletes a transfer, restoring the affected accounts to their recorded pre-balances.
pub async fn delete_transfer(
    store: &StoreHandle,
    transfer: TransferId,
    operator: UserId,
) -> Result<(), StoreError> {
    TransferRepository::new(store.clone())
        .delete_transfer(transfer, operator)
        .await
}

/// Aligns the customer-credits account with the customer receivable.
pub async fn sync_customer_credit_account(
    store: &StoreHandle,
    operator: UserId,
) -> Result<Option<account_transfers::Model>, StoreError> {
    AccountRepository::new(store.clone())
        .sync_customer_credit_account(operator)
        .await
}

// ---------------------------------------------------------------------------
// Reconciliation and snapshots
// ---------------------------------------------------------------------------

/// Checks the agency cash against an observed balance.
pub async fn check_cash(
    store: &StoreHandle,
    operator: UserId,
    observed_balance: Decimal,
    since: Option<DateTime<FixedOffset>>,
) -> Result<CheckId, StoreError> {
    let check = ReconciliationRepository::new(store.clone())
        .check_cash(operator, observed_balance, since)
        .await?;
    Ok(CheckId::from_uuid(check.id))
}

/// Checks observed totals per accounting category.
pub async fn check_global(
    store: &StoreHandle,
    operator: UserId,
    observed_by_category: &[(AccountCategory, Decimal)],
) -> Result<Vec<reconciliation_checks::Model>, StoreError> {
    ReconciliationRepository::new(store.clone())
        .check_global(operator, observed_by_category)
        .await
}

/// Reconciliation checks, newest first.
pub async fn list_checks(
    store: &StoreHandle,
    page: PageRequest,
) -> Result<PageResponse<reconciliation_checks::Model>, StoreError> {
    ReconciliationRepository::new(store.clone())
        .list_checks(page)
        .await
}

/// Records a periodic balance snapshot.
pub async fn take_balance_snapshot(
    store: &StoreHandle,
    operator: UserId,
    notes: Option<String>,
) -> Result<balance_snapshots::Model, StoreError> {
    SnapshotRepository::new(store.clone()).take(operator, notes).await
}

// ---------------------------------------------------------------------------
// Customer notices
// ---------------------------------------------------------------------------

/// Sends a notice to a customer.
pub async fn create_notice(
    store: &StoreHandle,
    input: CreateNoticeInput,
    operator: UserId,
) -> Result<notices::Model, StoreError> {
    NoticeRepository::new(store.clone()).create(input, operator).await
}

/// Marks a notice as read. `false` when it already was.
pub async fn mark_notice_read(
    store: &StoreHandle,
    notice: NoticeId,
    actor: UserId,
) -> Result<bool, StoreError> {
    NoticeRepository::new(store.clone()).mark_read(notice, actor).await
}

/// A customer's notices, newest first.
pub async fn list_notices(
    store: &StoreHandle,
    customer: CustomerId,
    unread_only: bool,
    page: PageRequest,
) -> Result<PageResponse<notices::Model>, StoreError> {
    NoticeRepository::new(store.clone())
        .list_for_customer(customer, unread_only, page)
        .await
}

/// Reminds every overdue debtor without a pending reminder. `None` uses the store's
/// configured overdue window.
pub async fn send_overdue_reminders(
    store: &StoreHandle,
    operator: UserId,
    days: Option<u32>,
) -> Result<Vec<notices::Model>, StoreError> {
    let days = days.unwrap_or(store.settings().overdue_days);
    NoticeRepository::new(store.clone())
        .send_overdue_reminders(operator, days, Utc::now())
        .await
}

// ---------------------------------------------------------------------------
// Audit trail
// ---------------------------------------------------------------------------

/// Appends an audit entry outside of any orchestrated mutation.
pub async fn log_action(
    store: &StoreHandle,
    actor: UserId,
    entity: EntityRef,
    action: AuditAction,
    before: Option<Value>,
    after: Option<Value>,
) -> Result<LogId, StoreError> {
    AuditRepository::new(store.clone())
        .log_action(actor, entity, action, None, before, after)
        .await
}

/// Audit entries, newest first, optionally for one entity.
pub async fn list_actions(
    store: &StoreHandle,
    entity: Option<EntityRef>,
    page: PageRequest,
) -> Result<PageResponse<audit_log::Model>, StoreError> {
    AuditRepository::new(store.clone()).list(entity, page).await
}
