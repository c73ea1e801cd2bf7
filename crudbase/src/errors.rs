//! Error taxonomy shared by both execution adapters.
//!
//! Absence is not an error: `get` and `update` return `Ok(None)` for a
//! missing identity and `delete` returns `Ok(false)`.
//!
//! Store failures are classified once, in `From<DbErr>`, so callers can match
//! on intent (`Conflict`, `StoreUnavailable`) instead of driver messages.

use crate::validation::{ValidationError, ValidationErrors};
use sea_orm::{DbErr, SqlErr};
use std::fmt;

#[derive(Debug)]
pub enum CrudError {
    /// Caller input rejected before the store was touched, or a field
    /// explicitly nulled that may not be null.
    Validation(ValidationErrors),

    /// Unique or foreign-key constraint violation reported by the store.
    Conflict {
        message: String,
    },

    /// Unknown field, operator/type mismatch, bad limit or malformed cursor.
    InvalidFilter {
        message: String,
    },

    /// Connection or transport failure. Not retried.
    StoreUnavailable(DbErr),

    /// Any other store-reported failure.
    Database(DbErr),

    /// The blocking adapter could not start its runtime.
    Runtime(std::io::Error),
}

impl CrudError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub fn is_invalid_filter(&self) -> bool {
        matches!(self, Self::InvalidFilter { .. })
    }

    #[must_use]
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Store and runtime failures are logged at `error`, caller mistakes at `debug`.
    pub(crate) fn log(&self, resource: &str, operation: &str) {
        match self {
            Self::StoreUnavailable(err) => {
                tracing::error!(resource, operation, error = %err, "store unavailable");
            }
            Self::Database(err) => {
                tracing::error!(resource, operation, error = %err, "database error");
            }
            Self::Runtime(err) => {
                tracing::error!(resource, operation, error = %err, "runtime error");
            }
            _ => {
                tracing::debug!(resource, operation, error = %self, "request rejected");
            }
        }
    }
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::Conflict { message } => write!(f, "conflict: {message}"),
            Self::InvalidFilter { message } => write!(f, "invalid filter: {message}"),
            Self::StoreUnavailable(err) => write!(f, "store unavailable: {err}"),
            Self::Database(err) => write!(f, "database error: {err}"),
            Self::Runtime(err) => write!(f, "failed to start runtime: {err}"),
        }
    }
}

impl std::error::Error for CrudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::StoreUnavailable(err) | Self::Database(err) => Some(err),
            Self::Runtime(err) => Some(err),
            Self::Conflict { .. } | Self::InvalidFilter { .. } => None,
        }
    }
}

impl From<ValidationErrors> for CrudError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<ValidationError> for CrudError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.into())
    }
}

/// Classification rules:
/// - unique / foreign-key violation -> `Conflict`
/// - connection, pool or socket failure -> `StoreUnavailable`
/// - everything else -> `Database`
impl From<DbErr> for CrudError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                return Self::conflict(format!("unique constraint violated: {message}"));
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                return Self::conflict(format!("foreign key constraint violated: {message}"));
            }
            _ => {}
        }
        if is_connection_failure(&err) {
            Self::StoreUnavailable(err)
        } else {
            Self::Database(err)
        }
    }
}

fn is_connection_failure(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        #[cfg(any(feature = "sqlite", feature = "postgresql", feature = "mysql"))]
        DbErr::Exec(sea_orm::RuntimeErr::SqlxError(inner))
        | DbErr::Query(sea_orm::RuntimeErr::SqlxError(inner)) => matches!(
            inner,
            sea_orm::sqlx::Error::Io(_)
                | sea_orm::sqlx::Error::PoolTimedOut
                | sea_orm::sqlx::Error::PoolClosed
                | sea_orm::sqlx::Error::WorkerCrashed
        ),
        _ => false,
    }
}
