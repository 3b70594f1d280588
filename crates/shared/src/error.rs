//! Application-wide error types.
//!
//! Every lower-level error (core rule violations, store failures) maps onto
//! one [`ErrorKind`], and callers see an [`AppError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Coarse classification shared by every error in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A caller-supplied value violates a precondition.
    Validation,
    /// The operation is not valid in the entity's current state.
    StateConflict,
    /// The referenced entity does not exist in the resolved store.
    NotFound,
    /// The principal lacks the role the operation requires.
    Forbidden,
    /// A database constraint would be violated.
    Integrity,
    /// Configuration could not be loaded or is inconsistent.
    Config,
    /// Anything else (driver failures, bugs).
    Internal,
}

impl ErrorKind {
    /// Fatal kinds abort the enclosing transaction and must never be swallowed.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Integrity | Self::Config | Self::Internal)
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not valid in the current state.
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Database constraint violation.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::StateConflict => Self::StateConflict(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Forbidden => Self::Forbidden(message),
            ErrorKind::Integrity => Self::Integrity(message),
            ErrorKind::Config => Self::Config(message),
            ErrorKind::Internal => Self::Internal(message),
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::StateConflict(_) => ErrorKind::StateConflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::StateConflict(_) => "STATE_CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Integrity(_) => "INTEGRITY_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true when the error must abort the enclosing transaction.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
