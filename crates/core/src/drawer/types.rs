//! Drawer session domain types.

use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::tenancy::Role;

/// Drawer session state.
///
/// The valid transitions are:
/// - Open → Closed (close)
/// - Closed → Verified (verify)
/// - Closed → Open (reopen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Shift in progress; movements can be booked.
    Open,
    /// Shift closed and cash counted.
    Closed,
    /// Closed session checked by a manager (terminal).
    Verified,
}

impl SessionState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Verified => "verified",
        }
    }

    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "verified" => Some(Self::Verified),
            _ => None,
        }
    }

    /// Closed and verified sessions count for the agency cash balance.
    #[must_use]
    pub const fn is_settled_shift(&self) -> bool {
        matches!(self, Self::Closed | Self::Verified)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-supplied values at close.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseInput {
    /// Counted cash; defaults to zero (with a warning) when absent.
    pub closing_cash: Option<Decimal>,
    /// Beverage takings deducted from the drawer.
    pub total_beverage_deduction: Decimal,
    /// Betting terminal balance, if read.
    pub terminal_balance: Option<Decimal>,
}

/// Totals computed at close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseOutcome {
    /// Counted cash actually used.
    pub closing_cash: Decimal,
    /// True when `closing_cash` was missing and defaulted to zero.
    pub closing_cash_defaulted: bool,
    /// Sum of positive movement amounts.
    pub total_in: Decimal,
    /// Absolute sum of negative movement amounts.
    pub total_out: Decimal,
    /// Beverage deduction carried from the input.
    pub total_beverage_deduction: Decimal,
    /// Terminal balance carried from the input.
    pub terminal_balance: Option<Decimal>,
    /// Derived drawer difference.
    pub cash_difference: Decimal,
}

/// Who is asking to reopen a session, and about which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReopenRequest {
    /// Requesting identity.
    pub requester: Uuid,
    /// Requester's effective role.
    pub requester_role: Role,
    /// Session owner.
    pub owner: Uuid,
    /// Session business date.
    pub session_date: NaiveDate,
    /// Today's business date.
    pub today: NaiveDate,
    /// Whether the owner already has another open session.
    pub owner_has_open_session: bool,
}

/// Structured snapshot of a session, stored before/after each transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Owning operator.
    pub operator_id: Uuid,
    /// Business date.
    pub business_date: NaiveDate,
    /// Start time.
    pub start_time: DateTime<FixedOffset>,
    /// End time, if closed.
    pub end_time: Option<DateTime<FixedOffset>>,
    /// State.
    pub state: SessionState,
    /// Opening cash.
    pub opening_cash: Decimal,
    /// Closing cash, if closed.
    pub closing_cash: Option<Decimal>,
    /// Total in.
    pub total_in: Decimal,
    /// Total out.
    pub total_out: Decimal,
    /// Beverage deduction.
    pub total_beverage_deduction: Decimal,
    /// Terminal balance.
    pub terminal_balance: Option<Decimal>,
    /// Cash difference.
    pub cash_difference: Decimal,
    /// Verifier, if verified.
    pub verified_by: Option<Uuid>,
}

impl SessionSnapshot {
    /// Serializes the snapshot for the audit trail.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
