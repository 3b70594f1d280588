//! Reconciliation domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a reconciliation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    /// Check started, figures not final.
    InProgress,
    /// |difference| < 0.01.
    Balanced,
    /// Observed above theoretical.
    Discrepancy,
    /// Observed below theoretical.
    Shortfall,
}

impl CheckState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Balanced => "balanced",
            Self::Discrepancy => "discrepancy",
            Self::Shortfall => "shortfall",
        }
    }

    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(Self::InProgress),
            "balanced" => Some(Self::Balanced),
            "discrepancy" => Some(Self::Discrepancy),
            "shortfall" => Some(Self::Shortfall),
            _ => None,
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inflow/outflow totals over a period of cash movements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// Sum of positive deltas.
    pub inflows: Decimal,
    /// Absolute sum of negative deltas.
    pub outflows: Decimal,
    /// Number of movements in the period.
    pub count: u64,
}

/// Figures derived for a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFigures {
    /// Theoretical closing balance.
    pub calculated_closing: Decimal,
    /// observed - calculated.
    pub difference: Decimal,
    /// Classification of the difference.
    pub state: CheckState,
}
