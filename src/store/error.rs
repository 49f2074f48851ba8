use std::time::Duration;

use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

use crate::worker::TaskError;

/// Coarse classification of a persistence failure, independent of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    UniqueViolation,
    ForeignKeyViolation,
    CheckViolation,
    Other,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// An invariant enforced in code rather than by the schema.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Db(#[from] DbErr),

    #[error("{source}; rollback also failed: {rollback}")]
    Rollback {
        source: Box<StoreError>,
        rollback: DbErr,
    },

    #[error("transaction exceeded its deadline of {0:?}")]
    Timeout(Duration),

    #[error("after-create hook failed: {0}")]
    Hook(#[source] Box<TaskError>),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        StoreError::Invalid(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound => ErrorKind::NotFound,
            StoreError::Invalid(_) => ErrorKind::CheckViolation,
            StoreError::Db(err) => classify(err),
            StoreError::Rollback { .. } | StoreError::Timeout(_) | StoreError::Hook(_) => {
                ErrorKind::Other
            }
        }
    }
}

/// Classifies a driver error by its SQLSTATE, never by its message.
pub fn classify(err: &DbErr) -> ErrorKind {
    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => ErrorKind::NotFound,
        DbErr::Query(RuntimeErr::SqlxError(err)) | DbErr::Exec(RuntimeErr::SqlxError(err)) => {
            classify_sqlx(err)
        }
        _ => ErrorKind::Other,
    }
}

fn classify_sqlx(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| classify_sql_state(&code))
            .unwrap_or(ErrorKind::Other),
        _ => ErrorKind::Other,
    }
}

/// Maps an SQLSTATE code from the integrity-constraint class (`23xxx`).
pub fn classify_sql_state(code: &str) -> ErrorKind {
    match code {
        "23505" => ErrorKind::UniqueViolation,
        "23503" => ErrorKind::ForeignKeyViolation,
        "23514" => ErrorKind::CheckViolation,
        _ => ErrorKind::Other,
    }
}
