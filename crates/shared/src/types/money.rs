//! Money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the ledger is a `rust_decimal::Decimal`; customer-facing
//! amounts are kept at two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for customer and drawer amounts.
pub const MONEY_SCALE: u32 = 2;

/// Differences strictly below this magnitude count as balanced.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Rounds an amount to two decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true when `|difference| < 0.01`.
#[must_use]
pub fn is_within_tolerance(difference: Decimal) -> bool {
    difference.abs() < BALANCE_TOLERANCE
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
