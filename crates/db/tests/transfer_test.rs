//! Integration tests for financial accounts, transfers, and balance snapshots.

mod common;

use common::Agency;
use distinta_core::movement::MovementKind;
use distinta_core::reconciliation::LiquidityTrend;
use distinta_core::transfer::{AccountKind, CashMovementKind, TransferError, TransferKind};
use distinta_db::StoreError;
use distinta_db::api;
use distinta_db::entities::{account_transfers, cash_movements, financial_accounts};
use distinta_db::repositories::{CreateAccountInput, RecordMovementInput};
use distinta_shared::types::{AccountId, CustomerId, TransferId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

async fn account_with(agency: &Agency, name: &str, balance: Decimal) -> AccountId {
    let id = AccountId::from_uuid(agency.account(name).await.id);
    api::direct_adjust(&agency.store, id, balance, agency.admin, None)
        .await
        .expect("Failed to set balance");
    id
}

async fn balance(agency: &Agency, id: AccountId) -> Decimal {
    financial_accounts::Entity::find_by_id(id.into_inner())
        .one(agency.store.conn())
        .await
        .expect("Failed to load account")
        .expect("Account missing")
        .balance
}

#[tokio::test]
async fn test_transfer_and_delete_restore_balances() {
    let agency = Agency::with_cash(Decimal::ZERO).await;
    let a = account_with(&agency, "Conto Corrente Principale", dec!(200)).await;
    let b = account_with(&agency, "Conto Gioco Online", dec!(50)).await;

    let id = api::transfer(&agency.store, a, b, dec!(100), agency.operator, Some("Ricarica".into()))
        .await
        .expect("Failed to transfer");
    assert_eq!(balance(&agency, a).await, dec!(100));
    assert_eq!(balance(&agency, b).await, dec!(150));

    let row = account_transfers::Entity::find_by_id(id.into_inner())
        .one(agency.store.conn())
        .await
        .expect("Failed to load transfer")
        .expect("Transfer missing");
    assert_eq!(TransferKind::from(row.kind), TransferKind::Transfer);
    assert_eq!((row.source_pre, row.source_post), (Some(dec!(200)), Some(dec!(100))));
    assert_eq!((row.destination_pre, row.destination_post), (Some(dec!(50)), Some(dec!(150))));

    api::delete_transfer(&agency.store, id, agency.operator)
        .await
        .expect("Failed to delete transfer");
    assert_eq!(balance(&agency, a).await, dec!(200));
    assert_eq!(balance(&agency, b).await, dec!(50));
    assert!(
        account_transfers::Entity::find_by_id(id.into_inner())
            .one(agency.store.conn())
            .await
            .expect("Failed to query")
            .is_none()
    );
}

#[tokio::test]
async fn test_invalid_transfers_rejected() {
    let agency = Agency::with_cash(Decimal::ZERO).await;
    let a = account_with(&agency, "Conto Corrente Principale", dec!(200)).await;
    let b = AccountId::from_uuid(agency.account("Conto Gioco Online").await.id);

    for amount in [Decimal::ZERO, dec!(-5)] {
        let err = api::transfer(&agency.store, a, b, amount, agency.operator, None)
            .await
            .expect_err("non-positive amount must fail");
        assert!(matches!(err, StoreError::Transfer(TransferError::InvalidAmount(_))));
    }
    let err = api::transfer(&agency.store, a, a, dec!(10), agency.operator, None)
        .await
        .expect_err("same account must fail");
    assert!(matches!(err, StoreError::Transfer(TransferError::SameAccount(_))));
    assert_eq!(balance(&agency, a).await, dec!(200));
}

#[tokio::test]
async fn test_direct_adjust_sides() {
    let agency = Agency::with_cash(Decimal::ZERO).await;
    let bank = account_with(&agency, "Conto Corrente Principale", dec!(500)).await;

    let down = api::direct_adjust(&agency.store, bank, dec!(400), agency.admin, None)
        .await
        .expect("Failed to adjust");
    let up = api::direct_adjust(&agency.store, bank, dec!(520), agency.admin, None)
        .await
        .expect("Failed to adjust");

    let load = |id: TransferId| {
        let conn = agency.store.conn().clone();
        async move {
            account_transfers::Entity::find_by_id(id.into_inner())
                .one(&conn)
                .await
                .expect("Failed to load")
                .expect("Transfer missing")
        }
    };
    let down = load(down).await;
    assert_eq!(down.amount, dec!(100));
    assert_eq!(down.source_account_id, Some(bank.into_inner()));
    assert!(down.destination_account_id.is_none());

    let up = load(up).await;
    assert_eq!(up.amount, dec!(120));
    assert_eq!(up.destination_account_id, Some(bank.into_inner()));
    assert_eq!(up.destination_post, Some(dec!(520)));
    assert!(up.source_account_id.is_none());
}

#[tokio::test]
async fn test_cash_transfers_write_the_cash_trail() {
    let agency = Agency::with_cash(dec!(300)).await;
    let cash = AccountId::from_uuid(agency.cash_account().await.id);
    let bank = account_with(&agency, "Conto Corrente Principale", dec!(1000)).await;

    let id = api::transfer(&agency.store, bank, cash, dec!(200), agency.admin, None)
        .await
        .expect("Failed to transfer");
    api::withdraw(&agency.store, cash, dec!(50), agency.admin, None)
        .await
        .expect("Failed to withdraw");
    assert_eq!(balance(&agency, cash).await, dec!(450));

    api::delete_transfer(&agency.store, id, agency.admin)
        .await
        .expect("Failed to delete");
    // Restored to the recorded pre-balance, discarding the later withdrawal.
    assert_eq!(balance(&agency, cash).await, dec!(300));

    let trail = cash_movements::Entity::find()
        .filter(cash_movements::Column::AccountId.eq(cash.into_inner()))
        .order_by_asc(cash_movements::Column::CreatedAt)
        .order_by_asc(cash_movements::Column::Id)
        .all(agency.store.conn())
        .await
        .expect("Failed to load trail");
    let kinds: Vec<CashMovementKind> = trail.iter().map(|m| m.kind.into()).collect();
    assert_eq!(
        kinds,
        vec![
            CashMovementKind::SystemInit,
            CashMovementKind::TransferIn,
            CashMovementKind::ManualWithdrawal,
            CashMovementKind::Correction,
        ]
    );
    assert!(trail[1].transfer_id.is_none());
    let undo = &trail[3];
    assert_eq!((undo.balance_before, undo.balance_after), (dec!(450), dec!(300)));
    assert_eq!(
        undo.notes.as_deref(),
        Some(format!("Annullamento movimento conti #{id}").as_str())
    );
}

#[tokio::test]
async fn test_account_with_transfers_cannot_be_deleted() {
    let agency = Agency::with_cash(Decimal::ZERO).await;
    let bank = account_with(&agency, "Conto Corrente Principale", dec!(10)).await;

    let err = api::delete_account(&agency.store, bank, agency.admin)
        .await
        .expect_err("referenced account must stay");
    assert!(matches!(err, StoreError::Integrity(_)));

    let fresh = api::create_account(
        &agency.store,
        CreateAccountInput {
            name: "Cassa Secondaria".to_string(),
            kind: AccountKind::Other,
            category: None,
            taxable: false,
            description: None,
        },
        agency.admin,
    )
    .await
    .expect("Failed to create account");
    api::delete_account(&agency.store, AccountId::from_uuid(fresh.id), agency.admin)
        .await
        .expect("unreferenced account can be deleted");
}

#[tokio::test]
async fn test_duplicate_account_name_rejected() {
    let agency = Agency::with_cash(Decimal::ZERO).await;
    let err = api::create_account(
        &agency.store,
        CreateAccountInput {
            name: "Cassa Agenzia".to_string(),
            kind: AccountKind::Cash,
            category: None,
            taxable: false,
            description: None,
        },
        agency.admin,
    )
    .await
    .expect_err("name is taken");
    assert!(matches!(err, StoreError::Transfer(TransferError::DuplicateName(_))));

    let again = api::seed_default_accounts(&agency.store, agency.admin)
        .await
        .expect("Failed to reseed");
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_customer_credit_account_tracks_receivable() {
    let agency = Agency::with_cash(Decimal::ZERO).await;
    let customer = CustomerId::from_uuid(agency.customer(dec!(100)).await.id);
    for (kind, amount) in [(MovementKind::BetSlip, dec!(70)), (MovementKind::Withdrawal, dec!(20))] {
        api::record_movement(
            &agency.store,
            RecordMovementInput {
                customer_id: customer,
                kind,
                amount,
                session_id: None,
                occurred_at: None,
                notes: None,
            },
            agency.operator,
        )
        .await
        .expect("Failed to record");
    }

    let adjusted = api::sync_customer_credit_account(&agency.store, agency.admin)
        .await
        .expect("Failed to sync");
    assert!(adjusted.is_some());
    assert_eq!(agency.account("Saldo Clienti").await.balance, dec!(50));

    let again = api::sync_customer_credit_account(&agency.store, agency.admin)
        .await
        .expect("Failed to sync");
    assert!(again.is_none());
}

#[tokio::test]
async fn test_balance_snapshot_trend() {
    let agency = Agency::with_cash(dec!(500)).await;
    account_with(&agency, "Conto Corrente Principale", dec!(1500)).await;
    account_with(&agency, "Saldo Agent", dec!(200)).await;

    let first = api::take_balance_snapshot(&agency.store, agency.admin, None)
        .await
        .expect("Failed to take snapshot");
    assert_eq!(first.total_liquidity, dec!(2000));
    assert_eq!(first.total_liabilities, dec!(200));
    assert_eq!(first.net_position, dec!(1800));
    assert_eq!(first.delta_previous, Decimal::ZERO);
    assert_eq!(LiquidityTrend::from(first.trend), LiquidityTrend::Stable);

    let cash = AccountId::from_uuid(agency.cash_account().await.id);
    api::withdraw(&agency.store, cash, dec!(100), agency.admin, None)
        .await
        .expect("Failed to withdraw");
    let second = api::take_balance_snapshot(&agency.store, agency.admin, Some("Fine settimana".into()))
        .await
        .expect("Failed to take snapshot");
    assert_eq!(second.delta_previous, dec!(-100));
    assert_eq!(LiquidityTrend::from(second.trend), LiquidityTrend::Shortfall);
}
