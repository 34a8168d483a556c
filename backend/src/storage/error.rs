//! Failures raised by the persistence layer.
//!
//! These never describe business outcomes. The domain wraps them in
//! `LibraryError::Storage` and the REST layer reports them as server errors.

use thiserror::Error;

/// SQLite primary result code for SQLITE_BUSY
const SQLITE_BUSY: &str = "5";
/// SQLite primary result code for SQLITE_LOCKED
const SQLITE_LOCKED: &str = "6";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("timed out waiting for a database connection")]
    Timeout,

    #[error("database is busy: {0}")]
    Busy(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("stored record is inconsistent: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Whether the caller may retry the whole operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Timeout | StorageError::Busy(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StorageError::Timeout,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return StorageError::UniqueViolation(db_err.message().to_string());
                }
                // Extended codes (e.g. 517, 262) carry the primary code in the low byte
                let primary = db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| (code & 0xff).to_string());
                match primary.as_deref() {
                    Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => {
                        StorageError::Busy(db_err.message().to_string())
                    }
                    _ => StorageError::Database(sqlx::Error::Database(db_err)),
                }
            }
            other => StorageError::Database(other),
        }
    }
}
