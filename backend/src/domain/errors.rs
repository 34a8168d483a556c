//! Typed outcomes of every catalog, directory and lending operation.
//!
//! Each variant carries structured context (entity kind, codes, rule) rather
//! than user-facing text. Turning them into responses is the job of the IO
//! layer.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Book,
    Member,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Book => write!(f, "book"),
            EntityKind::Member => write!(f, "member"),
        }
    }
}

/// Business rules that can refuse a borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LendingRule {
    OutOfStock,
    MemberPenalized,
    MaxLoansReached,
}

impl LendingRule {
    /// Stable machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            LendingRule::OutOfStock => "out_of_stock",
            LendingRule::MemberPenalized => "penalized",
            LendingRule::MaxLoansReached => "max_borrowed",
        }
    }
}

impl fmt::Display for LendingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse category used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    BusinessRule,
    InvalidInput,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{entity} with code {code} not found")]
    NotFound { entity: EntityKind, code: String },

    #[error("no outstanding loan of book {book_code} by member {member_code}")]
    LoanNotFound { book_code: String, member_code: String },

    #[error("{entity} with code {code} already exists")]
    Conflict { entity: EntityKind, code: String },

    #[error("lending rule violated: {0}")]
    RuleViolation(LendingRule),

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: &'static str },

    #[error("data integrity violation: {0}")]
    Integrity(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;

impl LibraryError {
    pub fn book_not_found(code: impl Into<String>) -> Self {
        LibraryError::NotFound { entity: EntityKind::Book, code: code.into() }
    }

    pub fn member_not_found(code: impl Into<String>) -> Self {
        LibraryError::NotFound { entity: EntityKind::Member, code: code.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LibraryError::NotFound { .. } | LibraryError::LoanNotFound { .. } => ErrorKind::NotFound,
            LibraryError::Conflict { .. } => ErrorKind::Conflict,
            LibraryError::RuleViolation(_) => ErrorKind::BusinessRule,
            LibraryError::InvalidInput { .. } => ErrorKind::InvalidInput,
            LibraryError::Integrity(_) | LibraryError::Storage(_) => ErrorKind::Infrastructure,
        }
    }

    /// Only transient storage failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            LibraryError::Storage(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<LendingRule> for LibraryError {
    fn from(rule: LendingRule) -> Self {
        LibraryError::RuleViolation(rule)
    }
}
