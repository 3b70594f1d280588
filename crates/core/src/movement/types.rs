//! Movement domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a customer movement.
///
/// The kind alone decides the sign of the stored amount:
/// - BetSlip, TopUp, DebtPayment → negative (reduces customer credit)
/// - Withdrawal, CreditCollection → positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Bet slip sold on credit.
    BetSlip,
    /// Gaming account top-up on credit.
    TopUp,
    /// Winnings or balance withdrawn by the customer.
    Withdrawal,
    /// Cash collected from the customer.
    CreditCollection,
    /// Cash paid out to the customer.
    DebtPayment,
}

impl MovementKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 5] = [
        Self::BetSlip,
        Self::TopUp,
        Self::Withdrawal,
        Self::CreditCollection,
        Self::DebtPayment,
    ];

    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BetSlip => "bet_slip",
            Self::TopUp => "top_up",
            Self::Withdrawal => "withdrawal",
            Self::CreditCollection => "credit_collection",
            Self::DebtPayment => "debt_payment",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bet_slip" => Some(Self::BetSlip),
            "top_up" => Some(Self::TopUp),
            "withdrawal" => Some(Self::Withdrawal),
            "credit_collection" => Some(Self::CreditCollection),
            "debt_payment" => Some(Self::DebtPayment),
            _ => None,
        }
    }

    /// Label used in generated notes.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BetSlip => "Schedina",
            Self::TopUp => "Ricarica",
            Self::Withdrawal => "Prelievo",
            Self::CreditCollection => "Incasso credito",
            Self::DebtPayment => "Pagamento debito",
        }
    }

    /// Returns true if amounts of this kind are stored negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        matches!(self, Self::BetSlip | Self::TopUp | Self::DebtPayment)
    }

    /// Applies the sign convention to a caller-supplied amount.
    ///
    /// The supplied sign is ignored; only the magnitude is kept.
    #[must_use]
    pub fn normalize(&self, amount: Decimal) -> Decimal {
        let magnitude = amount.abs();
        if self.is_negative() { -magnitude } else { magnitude }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer risk rating, A (excellent) to E (high risk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RiskRating {
    /// Excellent.
    A,
    /// Good.
    B,
    /// Average.
    #[default]
    C,
    /// Risky.
    D,
    /// High risk.
    E,
}

impl RiskRating {
    /// Returns the single-letter representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    /// Parses a rating letter (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            "E" => Some(Self::E),
            _ => None,
        }
    }
}

impl fmt::Display for RiskRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
