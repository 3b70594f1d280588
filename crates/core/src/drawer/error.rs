//! Drawer session error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use distinta_shared::ErrorKind;

use crate::drawer::types::SessionState;

/// Errors that can occur during drawer session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawerError {
    /// Attempted an invalid state transition.
    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition {
        /// The current state.
        from: SessionState,
        /// The attempted target state.
        to: SessionState,
    },

    /// A verified session is final.
    #[error("Verified sessions cannot be reopened")]
    CannotReopenVerified,

    /// The operator already has an open session.
    #[error("Operator {0} already has an open cash session")]
    AlreadyOpen(Uuid),

    /// Opening cash must be strictly positive.
    #[error("Opening cash must be positive, got {0}")]
    NonPositiveOpeningCash(Decimal),

    /// Opening cash exceeds what the agency cash account holds.
    #[error("Opening cash {requested} exceeds agency cash balance {available}")]
    InsufficientAgencyCash {
        /// Requested opening cash.
        requested: Decimal,
        /// Current agency cash balance.
        available: Decimal,
    },

    /// Beverage deduction cannot be negative.
    #[error("Beverage deduction cannot be negative")]
    NegativeDeduction,

    /// Only managers and admins verify sessions.
    #[error("User {0} is not authorized to verify cash sessions")]
    NotAuthorizedToVerify(Uuid),

    /// Reopen is limited to the owner on the same day, or an admin.
    #[error("User {0} is not authorized to reopen this cash session")]
    NotAuthorizedToReopen(Uuid),
}

impl DrawerError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveOpeningCash(_)
            | Self::InsufficientAgencyCash { .. }
            | Self::NegativeDeduction => ErrorKind::Validation,

            Self::InvalidTransition { .. } | Self::CannotReopenVerified | Self::AlreadyOpen(_) => {
                ErrorKind::StateConflict
            }

            Self::NotAuthorizedToVerify(_) | Self::NotAuthorizedToReopen(_) => {
                ErrorKind::Forbidden
            }
        }
    }

    /// Returns the error code for callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::CannotReopenVerified => "CANNOT_REOPEN_VERIFIED",
            Self::AlreadyOpen(_) => "SESSION_ALREADY_OPEN",
            Self::NonPositiveOpeningCash(_) => "NON_POSITIVE_OPENING_CASH",
            Self::InsufficientAgencyCash { .. } => "INSUFFICIENT_AGENCY_CASH",
            Self::NegativeDeduction => "NEGATIVE_DEDUCTION",
            Self::NotAuthorizedToVerify(_) => "NOT_AUTHORIZED_TO_VERIFY",
            Self::NotAuthorizedToReopen(_) => "NOT_AUTHORIZED_TO_REOPEN",
        }
    }
}
