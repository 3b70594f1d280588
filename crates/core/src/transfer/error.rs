//! Transfer error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use distinta_shared::ErrorKind;

/// Errors raised by transfer rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    /// Transfer amounts must be strictly positive.
    #[error("Invalid transfer amount {0}: must be greater than zero")]
    InvalidAmount(Decimal),

    /// Source and destination are the same account.
    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(Uuid),

    /// The transfer kind needs a side that was not supplied.
    #[error("Transfer is missing its {0} account")]
    MissingSide(&'static str),

    /// An account with this name already exists.
    #[error("Account name '{0}' already exists")]
    DuplicateName(String),

    /// The agency cash account is missing from the store.
    #[error("Agency cash account '{0}' not found")]
    CashAccountMissing(String),

    /// No account of the given kind exists in the store.
    #[error("No '{0}' account found")]
    KindMissing(&'static str),
}

impl TransferError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_) | Self::SameAccount(_) | Self::MissingSide(_) => {
                ErrorKind::Validation
            }
            Self::DuplicateName(_) => ErrorKind::StateConflict,
            Self::CashAccountMissing(_) | Self::KindMissing(_) => ErrorKind::NotFound,
        }
    }

    /// Returns the error code for callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::SameAccount(_) => "SAME_ACCOUNT",
            Self::MissingSide(_) => "MISSING_SIDE",
            Self::DuplicateName(_) => "DUPLICATE_ACCOUNT_NAME",
            Self::CashAccountMissing(_) => "CASH_ACCOUNT_MISSING",
            Self::KindMissing(_) => "ACCOUNT_KIND_MISSING",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_amount_error() {
        let err = TransferError::InvalidAmount(Decimal::ZERO);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.error_code(), "INVALID_AMOUNT");
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_cash_account_missing_error() {
        let err = TransferError::CashAccountMissing("Cassa Agenzia".into());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
