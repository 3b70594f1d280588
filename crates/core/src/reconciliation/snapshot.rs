//! Periodic balance snapshots ("bilancio periodico").

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transfer::AccountKind;

/// Direction of net position against the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityTrend {
    /// Net position decreased.
    Shortfall,
    /// Net position increased.
    Surplus,
    /// No change.
    Stable,
}

impl LiquidityTrend {
    /// Trend for a change in net position.
    #[must_use]
    pub fn from_delta(delta: Decimal) -> Self {
        if delta < Decimal::ZERO {
            Self::Shortfall
        } else if delta > Decimal::ZERO {
            Self::Surplus
        } else {
            Self::Stable
        }
    }

    /// Returns the string representation of the trend.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shortfall => "shortfall",
            Self::Surplus => "surplus",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for LiquidityTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind totals captured by a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTotals {
    /// Cash accounts.
    pub cash: Decimal,
    /// Bank accounts.
    pub bank: Decimal,
    /// Online platform balances.
    pub online: Decimal,
    /// Customer receivables.
    pub customers: Decimal,
    /// Agent balances.
    pub agents: Decimal,
    /// Expenses.
    pub expenses: Decimal,
    /// Revenue.
    pub revenue: Decimal,
    /// Owner withdrawals.
    pub owner_withdrawals: Decimal,
    /// Owner deposits.
    pub owner_deposits: Decimal,
}

impl SnapshotTotals {
    /// Accumulates account balances by kind. `Other` accounts are ignored.
    #[must_use]
    pub fn from_accounts<I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = (AccountKind, Decimal)>,
    {
        let mut totals = Self::default();
        for (kind, balance) in accounts {
            let slot = match kind {
                AccountKind::Cash => &mut totals.cash,
                AccountKind::Bank => &mut totals.bank,
                AccountKind::Online => &mut totals.online,
                AccountKind::CustomerCredits => &mut totals.customers,
                AccountKind::AgentBalance => &mut totals.agents,
                AccountKind::Expense => &mut totals.expenses,
                AccountKind::Revenue => &mut totals.revenue,
                AccountKind::OwnerWithdrawal => &mut totals.owner_withdrawals,
                AccountKind::OwnerDeposit => &mut totals.owner_deposits,
                AccountKind::Other => continue,
            };
            *slot += balance;
        }
        totals
    }

    /// cash + bank + online
    #[must_use]
    pub fn total_liquidity(&self) -> Decimal {
        self.cash + self.bank + self.online
    }

    /// Liquidity plus customer receivables.
    #[must_use]
    pub fn total_assets(&self) -> Decimal {
        self.total_liquidity() + self.customers
    }

    /// Agent balances.
    #[must_use]
    pub fn total_liabilities(&self) -> Decimal {
        self.agents
    }

    /// Assets minus liabilities.
    #[must_use]
    pub fn net_position(&self) -> Decimal {
        self.total_assets() - self.total_liabilities()
    }
}
