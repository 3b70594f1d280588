//! Notice domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use distinta_shared::types::round_money;

/// What a notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Warning (avviso).
    Warning,
    /// Payment reminder (sollecito).
    Reminder,
    /// Informational message (informativa).
    Information,
}

impl NoticeKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Reminder => "reminder",
            Self::Information => "information",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "warning" => Some(Self::Warning),
            "reminder" => Some(Self::Reminder),
            "information" => Some(Self::Information),
            _ => None,
        }
    }

    /// Label shown to the agency staff.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Warning => "Avviso",
            Self::Reminder => "Sollecito",
            Self::Information => "Informativa",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read state of a notice. New notices are unread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeState {
    /// Not yet read.
    #[default]
    Unread,
    /// Read.
    Read,
}

impl NoticeState {
    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }

    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unread" => Some(Self::Unread),
            "read" => Some(Self::Read),
            _ => None,
        }
    }

    /// State after marking as read, or `None` when already read.
    #[must_use]
    pub const fn mark_read(self) -> Option<Self> {
        match self {
            Self::Unread => Some(Self::Read),
            Self::Read => None,
        }
    }
}

impl fmt::Display for NoticeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment reminder text for a customer owing `-balance` since `since`.
#[must_use]
pub fn reminder_text(customer_name: &str, balance: Decimal, since: NaiveDate) -> String {
    let owed = round_money(-balance);
    format!(
        "Gentile {customer_name}, risulta un saldo a debito di € {owed} non regolato dal {}. \
         La preghiamo di provvedere al pagamento.",
        since.format("%d/%m/%Y")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(NoticeKind::Warning, "warning", "Avviso")]
    #[case(NoticeKind::Reminder, "reminder", "Sollecito")]
    #[case(NoticeKind::Information, "information", "Informativa")]
    fn test_kind_strings(#[case] kind: NoticeKind, #[case] stored: &str, #[case] label: &str) {
        assert_eq!(kind.as_str(), stored);
        assert_eq!(NoticeKind::parse(stored), Some(kind));
        assert_eq!(kind.label(), label);
    }

    #[test]
    fn test_mark_read_once() {
        let state = NoticeState::default();
        assert_eq!(state, NoticeState::Unread);
        assert_eq!(state.mark_read(), Some(NoticeState::Read));
        assert_eq!(NoticeState::Read.mark_read(), None);
        assert_eq!(NoticeState::parse("letta"), None);
    }

    #[test]
    fn test_reminder_text() {
        let since = NaiveDate::from_ymd_opt(2026, 10, 3).unwrap();
        let text = reminder_text("Rossi Luca", dec!(-70), since);
        assert!(text.starts_with("Gentile Rossi Luca, risulta un saldo a debito di € 70"));
        assert!(text.contains("dal 03/10/2026"));
    }
}
