//! Property-based tests for DrawerService.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::drawer::error::DrawerError;
use crate::drawer::service::DrawerService;
use crate::drawer::types::{CloseInput, SessionState};
use crate::tenancy::Role;

/// Strategy for generating two-decimal amounts, either sign.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-5_000_000i64..5_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating non-negative two-decimal amounts.
fn arb_non_negative() -> impl Strategy<Value = Decimal> {
    (0i64..5_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Open),
        Just(SessionState::Closed),
        Just(SessionState::Verified),
    ]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Operator), Just(Role::Manager), Just(Role::Admin)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property: close formula**
    ///
    /// cash_difference == closing_cash - total_in + total_out - deduction [- terminal]
    #[test]
    fn prop_close_formula_exact(
        closing in arb_non_negative(),
        deduction in arb_non_negative(),
        terminal in prop::option::of(arb_amount()),
        amounts in prop::collection::vec(arb_amount(), 0..20),
    ) {
        let input = CloseInput {
            closing_cash: Some(closing),
            total_beverage_deduction: deduction,
            terminal_balance: terminal,
        };
        let outcome = DrawerService::close(SessionState::Open, &input, amounts.clone()).unwrap();

        let total_in: Decimal = amounts.iter().filter(|a| **a > Decimal::ZERO).sum();
        let total_out: Decimal = amounts.iter().filter(|a| **a < Decimal::ZERO).map(|a| a.abs()).sum();
        prop_assert_eq!(outcome.total_in, total_in);
        prop_assert_eq!(outcome.total_out, total_out);

        let expected = closing - total_in + total_out - deduction - terminal.unwrap_or(Decimal::ZERO);
        prop_assert_eq!(outcome.cash_difference, expected);
    }

    /// **Property: at most one open session**
    #[test]
    fn prop_second_open_refused(
        opening in arb_non_negative(),
        cash in arb_non_negative(),
        operator in any::<u128>().prop_map(Uuid::from_u128),
    ) {
        prop_assert_eq!(
            DrawerService::open(operator, true, opening, cash),
            Err(DrawerError::AlreadyOpen(operator))
        );
    }

    /// **Property: only closed sessions close-transition onward**
    #[test]
    fn prop_transitions_respect_state(state in arb_state(), role in arb_role()) {
        let user = Uuid::nil();
        let close = DrawerService::close(state, &CloseInput::default(), []);
        prop_assert_eq!(close.is_ok(), state == SessionState::Open);

        let verify = DrawerService::verify(state, user, role);
        prop_assert_eq!(verify.is_ok(), state == SessionState::Closed && role.can_verify());
    }
}
