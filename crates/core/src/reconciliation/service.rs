//! Reconciliation service.

use rust_decimal::Decimal;

use distinta_shared::types::is_within_tolerance;

use crate::reconciliation::types::{CheckFigures, CheckState, PeriodTotals};
use crate::transfer::AccountCategory;

/// Stateless reconciliation rules.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Classifies a difference (observed - calculated).
    ///
    /// - |difference| < 0.01 → Balanced
    /// - difference < 0 → Shortfall
    /// - otherwise → Discrepancy
    #[must_use]
    pub fn classify(difference: Decimal) -> CheckState {
        if is_within_tolerance(difference) {
            CheckState::Balanced
        } else if difference < Decimal::ZERO {
            CheckState::Shortfall
        } else {
            CheckState::Discrepancy
        }
    }

    /// Totals a period of signed cash deltas.
    #[must_use]
    pub fn period_totals<I>(deltas: I) -> PeriodTotals
    where
        I: IntoIterator<Item = Decimal>,
    {
        deltas
            .into_iter()
            .fold(PeriodTotals::default(), |mut totals, delta| {
                if delta > Decimal::ZERO {
                    totals.inflows += delta;
                } else {
                    totals.outflows += delta.abs();
                }
                totals.count += 1;
                totals
            })
    }

    /// Figures for a cash check: `opening + inflows - outflows` vs observed.
    #[must_use]
    pub fn evaluate_cash(opening: Decimal, totals: &PeriodTotals, observed: Decimal) -> CheckFigures {
        let calculated_closing = opening + totals.inflows - totals.outflows;
        Self::evaluate(calculated_closing, observed)
    }

    /// Theoretical balance of a category: the sum of its account balances.
    #[must_use]
    pub fn category_total<I>(category: AccountCategory, accounts: I) -> Decimal
    where
        I: IntoIterator<Item = (AccountCategory, Decimal)>,
    {
        accounts
            .into_iter()
            .filter(|(c, _)| *c == category)
            .map(|(_, balance)| balance)
            .sum()
    }

    /// Figures for any theoretical value vs observed.
    #[must_use]
    pub fn evaluate(calculated_closing: Decimal, observed: Decimal) -> CheckFigures {
        let difference = observed - calculated_closing;
        CheckFigures {
            calculated_closing,
            difference,
            state: Self::classify(difference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0), CheckState::Balanced)]
    #[case(dec!(0.005), CheckState::Balanced)]
    #[case(dec!(-0.009), CheckState::Balanced)]
    #[case(dec!(-0.01), CheckState::Shortfall)]
    #[case(dec!(-40), CheckState::Shortfall)]
    #[case(dec!(0.01), CheckState::Discrepancy)]
    #[case(dec!(12.5), CheckState::Discrepancy)]
    fn test_classify(#[case] difference: Decimal, #[case] expected: CheckState) {
        assert_eq!(ReconciliationService::classify(difference), expected);
    }

    #[test]
    fn test_sub_cent_observation_is_balanced() {
        let figures = ReconciliationService::evaluate(dec!(1000), dec!(1000.005));
        assert_eq!(figures.difference, dec!(0.005));
        assert_eq!(figures.state, CheckState::Balanced);
    }

    #[test]
    fn test_category_total() {
        let accounts = [
            (AccountCategory::Liquidity, dec!(400)),
            (AccountCategory::Liquidity, dec!(1500)),
            (AccountCategory::Receivable, dec!(70)),
        ];
        assert_eq!(
            ReconciliationService::category_total(AccountCategory::Liquidity, accounts),
            dec!(1900)
        );
        assert_eq!(
            ReconciliationService::category_total(AccountCategory::Payable, accounts),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_cash_evaluation() {
        let totals = ReconciliationService::period_totals([dec!(500), dec!(-100), dec!(120)]);
        assert_eq!(totals.inflows, dec!(620));
        assert_eq!(totals.outflows, dec!(100));
        assert_eq!(totals.count, 3);

        let figures = ReconciliationService::evaluate_cash(dec!(0), &totals, dec!(500));
        assert_eq!(figures.calculated_closing, dec!(520));
        assert_eq!(figures.difference, dec!(-20));
        assert_eq!(figures.state, CheckState::Shortfall);
    }
}
