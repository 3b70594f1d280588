//! Movement error types.

use thiserror::Error;
use uuid::Uuid;

use distinta_shared::ErrorKind;

/// Errors raised by movement and settlement rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MovementError {
    /// Movement amounts must be non-zero.
    #[error("Movement amount must be non-zero")]
    ZeroAmount,

    /// Credit limit cannot be negative.
    #[error("Credit limit cannot be negative")]
    NegativeCreditLimit,

    /// The movement has already been settled.
    #[error("Movement {0} is already settled")]
    AlreadySettled(Uuid),

    /// Settled movements are part of history and cannot be edited or deleted.
    #[error("Movement {0} is settled and cannot be modified")]
    SettledImmutable(Uuid),

    /// A compensating entry points at this movement.
    #[error("Movement {0} has a compensating entry and cannot be deleted")]
    HasCompensatingEntry(Uuid),

    /// The operator has no open drawer session to book the movement in.
    #[error("Operator {0} has no open cash session")]
    NoOpenSession(Uuid),

    /// The referenced session is not open.
    #[error("Cash session {0} is not open")]
    SessionNotOpen(Uuid),
}

impl MovementError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount | Self::NegativeCreditLimit => ErrorKind::Validation,
            Self::AlreadySettled(_)
            | Self::SettledImmutable(_)
            | Self::HasCompensatingEntry(_)
            | Self::NoOpenSession(_)
            | Self::SessionNotOpen(_) => ErrorKind::StateConflict,
        }
    }

    /// Returns the error code for callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeCreditLimit => "NEGATIVE_CREDIT_LIMIT",
            Self::AlreadySettled(_) => "ALREADY_SETTLED",
            Self::SettledImmutable(_) => "SETTLED_IMMUTABLE",
            Self::HasCompensatingEntry(_) => "HAS_COMPENSATING_ENTRY",
            Self::NoOpenSession(_) => "NO_OPEN_SESSION",
            Self::SessionNotOpen(_) => "SESSION_NOT_OPEN",
        }
    }
}
