//! Integration tests for the drawer session lifecycle and its agency cash postings.

mod common;

use common::Agency;
use distinta_core::drawer::{CloseInput, DrawerError, SessionState};
use distinta_core::movement::MovementKind;
use distinta_core::transfer::CashMovementKind;
use distinta_db::StoreError;
use distinta_db::api;
use distinta_db::entities::{
    account_transfers, cash_balance_snapshots, cash_movements, cash_sessions, financial_accounts,
};
use distinta_db::repositories::{CloseSessionInput, RecordMovementInput};
use distinta_shared::types::{AccountId, CustomerId, SessionId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

fn close_input(closing_cash: Option<Decimal>, deduction: Decimal) -> CloseSessionInput {
    CloseSessionInput {
        values: CloseInput {
            closing_cash,
            total_beverage_deduction: deduction,
            terminal_balance: None,
        },
        notes: None,
    }
}

async fn book(agency: &Agency, customer: CustomerId, session: SessionId, kind: MovementKind, amount: Decimal) {
    api::record_movement(
        &agency.store,
        RecordMovementInput {
            customer_id: customer,
            kind,
            amount,
            session_id: Some(session),
            occurred_at: None,
            notes: None,
        },
        agency.operator,
    )
    .await
    .expect("Failed to book movement");
}

async fn cash_trail(agency: &Agency) -> Vec<cash_movements::Model> {
    let cash = agency.cash_account().await;
    cash_movements::Entity::find()
        .filter(cash_movements::Column::AccountId.eq(cash.id))
        .order_by_asc(cash_movements::Column::CreatedAt)
        .order_by_asc(cash_movements::Column::Id)
        .all(agency.store.conn())
        .await
        .expect("Failed to load cash trail")
}

#[tokio::test]
async fn test_open_close_moves_agency_cash() {
    let agency = Agency::with_cash(dec!(500)).await;
    let customer = CustomerId::from_uuid(agency.customer(Decimal::ZERO).await.id);

    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    assert_eq!(agency.cash_account().await.balance, dec!(400));

    book(&agency, customer, session, MovementKind::Withdrawal, dec!(50)).await;
    book(&agency, customer, session, MovementKind::BetSlip, dec!(10)).await;

    let closed = api::close_session(
        &agency.store,
        session,
        agency.operator,
        close_input(Some(dec!(120)), dec!(5)),
    )
    .await
    .expect("Failed to close session");
    assert_eq!(SessionState::from(closed.state), SessionState::Closed);
    assert_eq!(closed.total_in, dec!(50));
    assert_eq!(closed.total_out, dec!(10));
    assert_eq!(closed.cash_difference, dec!(75));
    assert!(closed.end_time.is_some());
    assert_eq!(agency.cash_account().await.balance, dec!(520));

    let trail = cash_trail(&agency).await;
    let kinds: Vec<CashMovementKind> = trail.iter().map(|m| m.kind.into()).collect();
    assert_eq!(
        kinds,
        vec![
            CashMovementKind::SystemInit,
            CashMovementKind::SessionOpen,
            CashMovementKind::SessionClose
        ]
    );
    let open = &trail[1];
    assert_eq!(open.amount, dec!(-100));
    assert_eq!((open.balance_before, open.balance_after), (dec!(500), dec!(400)));
    assert_eq!(open.session_id, Some(session.into_inner()));
    assert!(open.transfer_id.is_some());
    assert_eq!(
        open.notes.as_deref(),
        Some(format!("Prelievo per apertura Distinta N° {session}").as_str())
    );
    let close = &trail[2];
    assert_eq!(close.amount, dec!(120));
    assert_eq!(
        close.notes.as_deref(),
        Some(format!("Versamento per chiusura Distinta N° {session} - Operatore: mario").as_str())
    );

    let snapshots = cash_balance_snapshots::Entity::find()
        .count(agency.store.conn())
        .await
        .expect("Failed to count snapshots");
    assert_eq!(snapshots, trail.len() as u64);
}

#[tokio::test]
async fn test_close_without_counted_cash_books_zero() {
    let agency = Agency::with_cash(dec!(500)).await;
    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");

    let closed = api::close_session(&agency.store, session, agency.operator, close_input(None, Decimal::ZERO))
        .await
        .expect("Failed to close session");
    assert_eq!(closed.closing_cash, Some(Decimal::ZERO));
    assert_eq!(closed.cash_difference, Decimal::ZERO);
    assert_eq!(agency.cash_account().await.balance, dec!(400));

    let last = cash_trail(&agency).await.pop().expect("close posting missing");
    assert_eq!(CashMovementKind::from(last.kind), CashMovementKind::SessionClose);
    assert_eq!(last.amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_second_open_session_rejected() {
    let agency = Agency::with_cash(dec!(500)).await;
    api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");

    let err = api::open_session(&agency.store, agency.operator, dec!(50), None)
        .await
        .expect_err("second open session must fail");
    assert!(matches!(err, StoreError::Drawer(DrawerError::AlreadyOpen(_))));

    let sessions = cash_sessions::Entity::find()
        .filter(cash_sessions::Column::OperatorId.eq(agency.operator.into_inner()))
        .count(agency.store.conn())
        .await
        .expect("Failed to count sessions");
    assert_eq!(sessions, 1);
    assert_eq!(agency.cash_account().await.balance, dec!(400));
}

#[tokio::test]
async fn test_open_requires_agency_cash() {
    let agency = Agency::with_cash(dec!(80)).await;

    let err = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect_err("opening above agency cash must fail");
    assert!(matches!(err, StoreError::Drawer(DrawerError::InsufficientAgencyCash { .. })));

    let err = api::open_session(&agency.store, agency.operator, Decimal::ZERO, None)
        .await
        .expect_err("zero opening cash must fail");
    assert!(matches!(err, StoreError::Drawer(DrawerError::NonPositiveOpeningCash(_))));
    assert_eq!(agency.cash_account().await.balance, dec!(80));
}

#[tokio::test]
async fn test_closing_twice_is_a_state_conflict() {
    let agency = Agency::with_cash(dec!(500)).await;
    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    api::close_session(&agency.store, session, agency.operator, close_input(Some(dec!(100)), Decimal::ZERO))
        .await
        .expect("Failed to close session");

    let err = api::close_session(&agency.store, session, agency.operator, close_input(Some(dec!(100)), Decimal::ZERO))
        .await
        .expect_err("closed session cannot close again");
    assert!(matches!(err, StoreError::Drawer(DrawerError::InvalidTransition { .. })));
    assert_eq!(agency.cash_account().await.balance, dec!(500));
}

#[tokio::test]
async fn test_verify_requires_manager() {
    let agency = Agency::with_cash(dec!(500)).await;
    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    api::close_session(&agency.store, session, agency.operator, close_input(Some(dec!(100)), Decimal::ZERO))
        .await
        .expect("Failed to close session");

    let err = api::verify_session(&agency.store, session, agency.operator)
        .await
        .expect_err("operator cannot verify");
    assert!(matches!(err, StoreError::Drawer(DrawerError::NotAuthorizedToVerify(_))));

    let verified = api::verify_session(&agency.store, session, agency.manager)
        .await
        .expect("Failed to verify");
    assert_eq!(SessionState::from(verified.state), SessionState::Verified);
    assert_eq!(verified.verified_by, Some(agency.manager.into_inner()));
    assert!(verified.verified_at.is_some());

    let err = api::reopen_session(&agency.store, session, agency.admin)
        .await
        .expect_err("verified session is terminal");
    assert!(matches!(err, StoreError::Drawer(DrawerError::CannotReopenVerified)));
}

#[tokio::test]
async fn test_verify_keeps_activity_after_close() {
    let agency = Agency::with_cash(dec!(500)).await;
    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    api::close_session(&agency.store, session, agency.operator, close_input(Some(dec!(120)), Decimal::ZERO))
        .await
        .expect("Failed to close session");

    let cash = AccountId::from_uuid(agency.cash_account().await.id);
    api::deposit(&agency.store, cash, dec!(30), agency.admin, None)
        .await
        .expect("Failed to deposit");
    let trail_len = cash_trail(&agency).await.len();

    api::verify_session(&agency.store, session, agency.manager)
        .await
        .expect("Failed to verify");
    assert_eq!(agency.cash_account().await.balance, dec!(550));
    assert_eq!(cash_trail(&agency).await.len(), trail_len);
}

#[tokio::test]
async fn test_verify_repairs_drifted_cash() {
    let agency = Agency::with_cash(dec!(500)).await;
    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    api::close_session(&agency.store, session, agency.operator, close_input(Some(dec!(120)), Decimal::ZERO))
        .await
        .expect("Failed to close session");

    // Simulate a write that bypassed the transfer engine.
    let cash = agency.cash_account().await;
    let mut active: financial_accounts::ActiveModel = cash.into();
    active.balance = Set(dec!(999));
    active.update(agency.store.conn()).await.expect("Failed to tamper");

    api::verify_session(&agency.store, session, agency.manager)
        .await
        .expect("Failed to verify");
    assert_eq!(agency.cash_account().await.balance, dec!(520));

    let last = cash_trail(&agency).await.pop().expect("verify posting missing");
    assert_eq!(CashMovementKind::from(last.kind), CashMovementKind::SessionVerify);
    assert_eq!(last.amount, dec!(-479));
    assert_eq!(
        last.notes.as_deref(),
        Some(format!("Ricalcolo cassa per verifica Distinta N° {session}").as_str())
    );
}

#[tokio::test]
async fn test_reopen_rules() {
    let agency = Agency::with_cash(dec!(500)).await;
    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    api::close_session(&agency.store, session, agency.operator, close_input(Some(dec!(100)), Decimal::ZERO))
        .await
        .expect("Failed to close session");
    let transfers_before = account_transfers::Entity::find()
        .count(agency.store.conn())
        .await
        .expect("Failed to count transfers");

    let err = api::reopen_session(&agency.store, session, agency.manager)
        .await
        .expect_err("manager cannot reopen another operator's session");
    assert!(matches!(err, StoreError::Drawer(DrawerError::NotAuthorizedToReopen(_))));

    let reopened = api::reopen_session(&agency.store, session, agency.operator)
        .await
        .expect("owner may reopen on the same day");
    assert_eq!(SessionState::from(reopened.state), SessionState::Open);
    assert!(reopened.end_time.is_none());

    // Close-time postings stay in place.
    assert_eq!(agency.cash_account().await.balance, dec!(500));
    let transfers_after = account_transfers::Entity::find()
        .count(agency.store.conn())
        .await
        .expect("Failed to count transfers");
    assert_eq!(transfers_after, transfers_before);
}

#[tokio::test]
async fn test_reopen_refused_while_owner_has_another_open_session() {
    let agency = Agency::with_cash(dec!(500)).await;
    let first = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    api::close_session(&agency.store, first, agency.operator, close_input(Some(dec!(100)), Decimal::ZERO))
        .await
        .expect("Failed to close session");
    api::open_session(&agency.store, agency.operator, dec!(50), None)
        .await
        .expect("Failed to open second session");

    let err = api::reopen_session(&agency.store, first, agency.admin)
        .await
        .expect_err("owner already has an open session");
    assert!(matches!(err, StoreError::Drawer(DrawerError::AlreadyOpen(_))));
}

#[tokio::test]
async fn test_session_summary_projects_difference() {
    let agency = Agency::with_cash(dec!(500)).await;
    let customer = CustomerId::from_uuid(agency.customer(Decimal::ZERO).await.id);
    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    book(&agency, customer, session, MovementKind::Withdrawal, dec!(50)).await;
    book(&agency, customer, session, MovementKind::TopUp, dec!(20)).await;

    let summary = api::session_summary(&agency.store, session, Some(dec!(90)))
        .await
        .expect("Failed to summarize");
    assert_eq!(summary.movement_count, 2);
    assert_eq!(summary.total_in, dec!(50));
    assert_eq!(summary.total_out, dec!(20));
    assert_eq!(summary.projected_difference, dec!(60));

    let summary = api::session_summary(&agency.store, session, None)
        .await
        .expect("Failed to summarize");
    assert_eq!(summary.projected_difference, dec!(-30));
}

#[tokio::test]
async fn test_every_transition_is_audited() {
    use distinta_core::audit::{AuditAction, EntityKind, EntityRef};

    let agency = Agency::with_cash(dec!(500)).await;
    let session = api::open_session(&agency.store, agency.operator, dec!(100), None)
        .await
        .expect("Failed to open session");
    api::close_session(&agency.store, session, agency.operator, close_input(Some(dec!(100)), Decimal::ZERO))
        .await
        .expect("Failed to close session");
    api::reopen_session(&agency.store, session, agency.operator)
        .await
        .expect("Failed to reopen");

    let page = api::list_actions(
        &agency.store,
        Some(EntityRef::new(EntityKind::CashSession, session)),
        Default::default(),
    )
    .await
    .expect("Failed to list audit");
    let actions: Vec<AuditAction> = page.data.iter().map(|e| e.action.into()).collect();
    assert_eq!(
        actions,
        vec![AuditAction::Reopen, AuditAction::StatusChange, AuditAction::Create]
    );
    let close = &page.data[1];
    assert_eq!(
        close.data_before.as_ref().and_then(|v| v.get("state")).and_then(|v| v.as_str()),
        Some("open")
    );
    assert_eq!(
        close.data_after.as_ref().and_then(|v| v.get("state")).and_then(|v| v.as_str()),
        Some("closed")
    );
}
