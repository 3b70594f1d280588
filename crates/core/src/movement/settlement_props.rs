//! Property-based tests for settlement planning.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::movement::balance::BalanceService;
use crate::movement::error::MovementError;
use crate::movement::settlement::{SettlementService, SettlementSubject};
use crate::movement::types::MovementKind;

fn arb_kind() -> impl Strategy<Value = MovementKind> {
    prop_oneof![
        Just(MovementKind::BetSlip),
        Just(MovementKind::TopUp),
        Just(MovementKind::Withdrawal),
        Just(MovementKind::CreditCollection),
        Just(MovementKind::DebtPayment),
    ]
}

fn arb_magnitude() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

fn subject(id: Uuid, kind: MovementKind, magnitude: Decimal, settled: bool) -> SettlementSubject {
    SettlementSubject {
        movement_id: id,
        kind,
        amount: kind.normalize(magnitude),
        settled,
        booked_on: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap_or_default(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property: settlement is compensating**
    ///
    /// The compensating amount is the exact negation of the original, and its
    /// stored sign is consistent with its own kind.
    #[test]
    fn prop_compensation_negates_original(
        id in arb_uuid(),
        kind in arb_kind(),
        magnitude in arb_magnitude(),
    ) {
        let original = subject(id, kind, magnitude, false);
        let plan = SettlementService::plan(&original).unwrap();
        prop_assert_eq!(plan.amount, -original.amount);
        prop_assert_eq!(plan.kind.normalize(plan.amount), plan.amount);
        prop_assert_eq!(plan.origin_movement_id, id);
        prop_assert!(plan.note.contains(&id.to_string()));
    }

    /// **Property: settled pair drops out of the balance**
    ///
    /// Once both rows are settled the unsettled sum loses exactly the original.
    #[test]
    fn prop_settled_pair_leaves_balance(
        kind in arb_kind(),
        magnitude in arb_magnitude(),
        others in prop::collection::vec((arb_kind(), arb_magnitude()), 0..10),
    ) {
        let original = subject(Uuid::nil(), kind, magnitude, false);
        let plan = SettlementService::plan(&original).unwrap();
        let mut rows: Vec<(Decimal, bool)> =
            others.iter().map(|(k, m)| (k.normalize(*m), false)).collect();
        let before = BalanceService::unsettled_total(
            rows.iter().copied().chain([(original.amount, false)]),
        );
        rows.push((original.amount, true));
        rows.push((plan.amount, true));
        let after = BalanceService::unsettled_total(rows);
        prop_assert_eq!(after, before - original.amount);
    }

    /// **Property: re-settlement is refused**
    #[test]
    fn prop_settled_is_refused(id in arb_uuid(), kind in arb_kind(), magnitude in arb_magnitude()) {
        let result = SettlementService::plan(&subject(id, kind, magnitude, true));
        prop_assert_eq!(result, Err(MovementError::AlreadySettled(id)));
    }
}
