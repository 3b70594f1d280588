//! Property-based tests for reconciliation classification.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::reconciliation::service::ReconciliationService;
use crate::reconciliation::types::CheckState;

/// Strategy for differences with up to four decimal places.
fn arb_difference() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property: reconciliation classification**
    ///
    /// balanced iff |d| < 0.01; shortfall iff d < 0 and not balanced;
    /// discrepancy otherwise.
    #[test]
    fn prop_classification(difference in arb_difference()) {
        let state = ReconciliationService::classify(difference);
        let balanced = difference.abs() < Decimal::new(1, 2);
        prop_assert_eq!(state == CheckState::Balanced, balanced);
        prop_assert_eq!(state == CheckState::Shortfall, !balanced && difference < Decimal::ZERO);
        prop_assert_eq!(state == CheckState::Discrepancy, !balanced && difference > Decimal::ZERO);
    }

    /// **Property: evaluation difference**
    #[test]
    fn prop_evaluate_difference(calculated in arb_difference(), observed in arb_difference()) {
        let figures = ReconciliationService::evaluate(calculated, observed);
        prop_assert_eq!(figures.difference, observed - calculated);
        prop_assert_eq!(figures.state, ReconciliationService::classify(observed - calculated));
    }

    /// **Property: period totals partition the deltas**
    #[test]
    fn prop_period_totals(deltas in prop::collection::vec(arb_difference(), 0..40)) {
        let totals = ReconciliationService::period_totals(deltas.clone());
        let net: Decimal = deltas.iter().copied().sum();
        prop_assert_eq!(totals.inflows - totals.outflows, net);
        prop_assert_eq!(totals.count, deltas.len() as u64);
        prop_assert!(totals.inflows >= Decimal::ZERO && totals.outflows >= Decimal::ZERO);
    }
}
