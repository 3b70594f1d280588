//! Customer balance engine.
//!
//! A customer's balance is a cache: the signed sum of the amounts of all
//! unsettled movements. It is rebuilt from the movement log, never edited.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stateless balance rules.
pub struct BalanceService;

impl BalanceService {
    /// Sums the amounts of unsettled movements.
    ///
    /// Each item is `(amount, settled)`. Returns zero for an empty log.
    #[must_use]
    pub fn unsettled_total<I>(movements: I) -> Decimal
    where
        I: IntoIterator<Item = (Decimal, bool)>,
    {
        movements
            .into_iter()
            .filter(|(_, settled)| !settled)
            .map(|(amount, _)| amount)
            .sum()
    }

    /// What the customers owe the agency: `-(sum of balances)`.
    ///
    /// Customer balances are negative while they owe, so debts count positive here.
    #[must_use]
    pub fn receivable<I>(balances: I) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        -balances.into_iter().sum::<Decimal>()
    }

    /// Builds the running balance over a chronologically ordered movement log.
    ///
    /// Every movement counts here, settled or not: this is the statement view.
    #[must_use]
    pub fn running_balances<I>(amounts: I) -> Vec<RunningBalance>
    where
        I: IntoIterator<Item = Decimal>,
    {
        let mut out: Vec<RunningBalance> = Vec::new();
        for amount in amounts {
            let next = match out.last() {
                Some(previous) => RunningBalance::next_entry(previous, amount),
                None => RunningBalance::first_entry(amount),
            };
            out.push(next);
        }
        out
    }
}

/// Credit position of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditView {
    /// Current cached balance (negative: the customer owes the agency).
    pub balance: Decimal,
    /// Maximum credit granted.
    pub credit_limit: Decimal,
}

impl CreditView {
    /// Creates a new credit view.
    #[must_use]
    pub const fn new(balance: Decimal, credit_limit: Decimal) -> Self {
        Self {
            balance,
            credit_limit,
        }
    }

    /// Credit still available to the customer.
    ///
    /// Negative balance: `credit_limit - |balance|`. Otherwise the positive
    /// balance adds to the limit.
    #[must_use]
    pub fn available_credit(&self) -> Decimal {
        if self.balance < Decimal::ZERO {
            self.credit_limit - self.balance.abs()
        } else {
            self.credit_limit + self.balance
        }
    }

    /// True when the debt exceeds the credit limit.
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        self.balance < Decimal::ZERO && self.balance.abs() > self.credit_limit
    }

    /// Amount by which the debt exceeds the limit, zero otherwise.
    #[must_use]
    pub fn over_limit_amount(&self) -> Decimal {
        if self.is_over_limit() {
            self.balance.abs() - self.credit_limit
        } else {
            Decimal::ZERO
        }
    }
}

/// Running balance information for one movement in a statement.
///
/// - sequence: monotonically increasing counter
/// - previous_balance: balance before this movement
/// - current_balance: balance after this movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Position in the statement, starting at 1.
    pub sequence: i64,
    /// Balance before this movement.
    pub previous_balance: Decimal,
    /// Balance after this movement.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Running balance for the first movement of a customer.
    #[must_use]
    pub fn first_entry(amount: Decimal) -> Self {
        Self {
            sequence: 1,
            previous_balance: Decimal::ZERO,
            current_balance: amount,
        }
    }

    /// Running balance following `previous`.
    ///
    /// - current_balance[N] = previous_balance[N] + amount
    /// - previous_balance[N] = current_balance[N-1]
    #[must_use]
    pub fn next_entry(previous: &Self, amount: Decimal) -> Self {
        Self {
            sequence: previous.sequence + 1,
            previous_balance: previous.current_balance,
            current_balance: previous.current_balance + amount,
        }
    }
}
