//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`NotFound`] thrown when a referenced account, customer or transaction
//!   does not exist.
//! - [`InvalidArgument`] thrown when the input is structurally invalid.
//! - [`IllegalState`] thrown when the operation is not allowed given the
//!   current state (closed account, insufficient funds).
//! - [`Conflict`] thrown when a concurrent writer changed an account
//!   between read and write, or kept the store locked past the busy timeout.
//!   Retrying the request is safe.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`InvalidArgument`]: EngineError::InvalidArgument
//!  [`IllegalState`]: EngineError::IllegalState
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::{DbErr, RuntimeErr, sqlx};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Illegal state: {0}")]
    IllegalState(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(DbErr),
}

/// SQLite primary result codes for a write lock held by another connection.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Whether the store refused the statement because another connection holds
/// the lock. Extended codes (e.g. `SQLITE_BUSY_SNAPSHOT`) carry the primary
/// code in their low byte.
fn is_lock_contention(err: &DbErr) -> bool {
    let (DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime)) = err else {
        return false;
    };
    let RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) = runtime else {
        return false;
    };
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        if is_lock_contention(&err) {
            return Self::Conflict(format!("store busy with a concurrent writer: {err}"));
        }
        Self::Database(err)
    }
}

/// Coarse classification of an [`EngineError`], used by callers to pick a
/// response class without matching every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    /// `InvalidArgument` and `IllegalState`.
    Rejected,
    Conflict,
    Storage,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) | Self::IllegalState(_) => ErrorKind::Rejected,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Storage,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::IllegalState(a), Self::IllegalState(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_group_rejections() {
        assert_eq!(
            EngineError::InvalidArgument("amount".to_string()).kind(),
            ErrorKind::Rejected
        );
        assert_eq!(
            EngineError::IllegalState("closed".to_string()).kind(),
            ErrorKind::Rejected
        );
        assert_eq!(
            EngineError::NotFound("account".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn plain_database_errors_stay_storage() {
        let err = EngineError::from(DbErr::Custom("disk full".to_string()));
        assert_eq!(err.kind(), ErrorKind::Storage);
        let err = EngineError::from(DbErr::Exec(RuntimeErr::Internal("boom".to_string())));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn display_carries_context() {
        let err = EngineError::IllegalState("insufficient funds".to_string());
        assert_eq!(err.to_string(), "Illegal state: insufficient funds");
    }
}
