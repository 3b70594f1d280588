//! Property-based tests for the balance engine and sign convention.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::movement::balance::{BalanceService, CreditView};
use crate::movement::types::MovementKind;

/// Strategy for generating two-decimal amounts, either sign.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating non-negative credit limits.
fn arb_limit() -> impl Strategy<Value = Decimal> {
    (0i64..5_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating movement kinds.
fn arb_kind() -> impl Strategy<Value = MovementKind> {
    prop_oneof![
        Just(MovementKind::BetSlip),
        Just(MovementKind::TopUp),
        Just(MovementKind::Withdrawal),
        Just(MovementKind::CreditCollection),
        Just(MovementKind::DebtPayment),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property: sign convention**
    ///
    /// The stored sign depends only on the kind, never on the supplied sign.
    #[test]
    fn prop_sign_follows_kind(kind in arb_kind(), amount in arb_amount()) {
        let stored = kind.normalize(amount);
        prop_assert_eq!(stored.abs(), amount.abs());
        if !amount.is_zero() {
            prop_assert_eq!(stored < Decimal::ZERO, kind.is_negative());
        }
        prop_assert_eq!(kind.normalize(-amount), stored);
    }

    /// **Property: balance equals unsettled sum**
    #[test]
    fn prop_balance_is_unsettled_sum(
        log in prop::collection::vec((arb_kind(), arb_amount(), any::<bool>()), 0..30)
    ) {
        let rows: Vec<(Decimal, bool)> = log
            .iter()
            .map(|(kind, amount, settled)| (kind.normalize(*amount), *settled))
            .collect();
        let expected: Decimal = rows.iter().filter(|(_, s)| !s).map(|(a, _)| *a).sum();
        prop_assert_eq!(BalanceService::unsettled_total(rows.clone()), expected);

        // recomputation is idempotent
        let again = BalanceService::unsettled_total(rows);
        prop_assert_eq!(again, expected);
    }

    /// **Property: over-limit consistency**
    #[test]
    fn prop_over_limit_consistent(balance in arb_amount(), limit in arb_limit()) {
        let view = CreditView::new(balance, limit);
        if view.is_over_limit() {
            prop_assert!(view.over_limit_amount() > Decimal::ZERO);
            prop_assert_eq!(view.available_credit(), -view.over_limit_amount());
        } else {
            prop_assert_eq!(view.over_limit_amount(), Decimal::ZERO);
            prop_assert!(view.available_credit() >= Decimal::ZERO);
        }
    }

    /// **Property: running balance chain**
    #[test]
    fn prop_running_balance_chain(amounts in prop::collection::vec(arb_amount(), 1..25)) {
        let rows = BalanceService::running_balances(amounts.clone());
        prop_assert_eq!(rows.len(), amounts.len());
        for window in rows.windows(2) {
            prop_assert_eq!(window[1].previous_balance, window[0].current_balance);
            prop_assert_eq!(window[1].sequence, window[0].sequence + 1);
        }
        let total: Decimal = amounts.iter().copied().sum();
        prop_assert_eq!(rows.last().map(|r| r.current_balance), Some(total));
    }
}
