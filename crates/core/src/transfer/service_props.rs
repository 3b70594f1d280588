//! Property-based tests for TransferService.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::transfer::service::TransferService;

fn arb_balance() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_positive() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property: transfer conservation**
    ///
    /// Source loses exactly what destination gains, and restore returns both.
    #[test]
    fn prop_transfer_conserves(
        source in arb_balance(),
        destination in arb_balance(),
        amount in arb_positive(),
    ) {
        let plan = TransferService::transfer(source, destination, amount).unwrap();
        let s = plan.source.unwrap();
        let d = plan.destination.unwrap();
        prop_assert_eq!(s.post, source - amount);
        prop_assert_eq!(d.post, destination + amount);
        prop_assert_eq!(s.delta() + d.delta(), Decimal::ZERO);
        prop_assert_eq!(
            TransferService::restore(plan.source, plan.destination),
            (Some(source), Some(destination))
        );
    }

    /// **Property: direct adjustment lands on the requested value**
    #[test]
    fn prop_adjustment_exact(old in arb_balance(), new in arb_balance()) {
        let plan = TransferService::direct_adjustment(old, new);
        let side = plan.source.or(plan.destination).unwrap();
        prop_assert_eq!(side.pre, old);
        prop_assert_eq!(side.post, new);
        prop_assert_eq!(plan.amount, (new - old).abs());
        prop_assert!(plan.source.is_some() != plan.destination.is_some());
        prop_assert_eq!(plan.source.is_some(), new < old);
    }

    /// **Property: non-positive amounts never produce a plan**
    #[test]
    fn prop_non_positive_rejected(balance in arb_balance(), cents in -100_000i64..=0i64) {
        let amount = Decimal::new(cents, 2);
        prop_assert!(TransferService::transfer(balance, balance, amount).is_err());
        prop_assert!(TransferService::deposit(balance, amount).is_err());
        prop_assert!(TransferService::withdraw(balance, amount).is_err());
    }
}
