//! Store-level errors.
//!
//! Core rule violations pass through unchanged; database failures are classified so that
//! constraint violations surface as fatal integrity errors.

use distinta_core::audit::EntityKind;
use distinta_core::drawer::DrawerError;
use distinta_core::movement::MovementError;
use distinta_core::transfer::TransferError;
use distinta_shared::{AppError, ErrorKind};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by repositories and orchestrated ledger operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Movement or settlement rule violated.
    #[error(transparent)]
    Movement(#[from] MovementError),

    /// Drawer lifecycle rule violated.
    #[error(transparent)]
    Drawer(#[from] DrawerError),

    /// Transfer rule violated.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Input failed field validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced row does not exist in the resolved store.
    #[error("{} not found: {id}", entity.label())]
    NotFound {
        /// Kind of the missing entity.
        entity: EntityKind,
        /// Requested id.
        id: Uuid,
    },

    /// Tenant code already registered.
    #[error("Tenant code '{0}' already exists")]
    DuplicateTenantCode(String),

    /// No connection is configured for the store key.
    #[error("Unknown store '{0}'")]
    UnknownStore(String),

    /// A relationship would be broken.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    pub fn not_found(entity: EntityKind, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Classification on the application taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Movement(e) => e.kind(),
            Self::Drawer(e) => e.kind(),
            Self::Transfer(e) => e.kind(),
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateTenantCode(_) => ErrorKind::StateConflict,
            Self::UnknownStore(_) => ErrorKind::Config,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::Database(e) => {
                if is_constraint_violation(e) {
                    ErrorKind::Integrity
                } else {
                    ErrorKind::Internal
                }
            }
        }
    }

    /// Stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Movement(e) => e.error_code(),
            Self::Drawer(e) => e.error_code(),
            Self::Transfer(e) => e.error_code(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DuplicateTenantCode(_) => "DUPLICATE_TENANT_CODE",
            Self::UnknownStore(_) => "UNKNOWN_STORE",
            Self::Integrity(_) => "INTEGRITY_ERROR",
            Self::Database(e) if is_constraint_violation(e) => "INTEGRITY_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// True for foreign-key and unique-constraint violations.
pub(crate) fn is_constraint_violation(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::ForeignKeyConstraintViolation(_) | SqlErr::UniqueConstraintViolation(_))
    )
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_core_errors_keep_their_kind() {
        let err = StoreError::from(DrawerError::NonPositiveOpeningCash(dec!(0)));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = StoreError::from(MovementError::AlreadySettled(Uuid::nil()));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn test_not_found_message_uses_label() {
        let err = StoreError::not_found(EntityKind::Customer, Uuid::nil());
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().starts_with("Cliente not found"));
    }

    #[test]
    fn test_integrity_is_fatal_in_app_error() {
        let app: AppError = StoreError::Integrity("account has transfers".into()).into();
        assert!(app.is_fatal());
        assert_eq!(app.error_code(), "INTEGRITY_ERROR");
    }

    #[test]
    fn test_plain_database_error_is_internal() {
        let err = StoreError::from(DbErr::Custom("boom".into()));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}
