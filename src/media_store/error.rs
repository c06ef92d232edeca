use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors raised by the record store while running statements.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database unavailable: {0}")]
    Connectivity(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Statement failed: {0}")]
    Statement(String),
}

impl StoreError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, StoreError::Connectivity(_))
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, StoreError::Constraint(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        let message = err.to_string();
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StoreError::Constraint(message),
            Some(
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly,
            ) => StoreError::Connectivity(message),
            _ => StoreError::Statement(message),
        }
    }
}
