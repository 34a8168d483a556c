//! # Storage Module
//!
//! Handles all data persistence for the library.
//!
//! The domain services only depend on the traits in [`traits`]. The SQLite
//! implementation lives in [`sqlite`] and could be swapped for another
//! relational store without touching the lending rules.
//!
//! ## Key Responsibilities
//!
//! - **Data Persistence**: books, members, and loan records
//! - **Transaction Safety**: every lending operation commits its three
//!   writes atomically through a [`traits::LendingUnitOfWork`]
//! - **Guarded Writes**: counters are only changed by conditional updates
//!   that re-check their precondition inside the transaction
//! - **Error Classification**: driver errors become [`StorageError`], with
//!   timeouts and lock contention marked retryable

pub mod error;
pub mod sqlite;
pub mod traits;

// Re-export the main types that other modules need
pub use error::{StorageError, StorageResult};
pub use sqlite::{DbConnection, PoolSettings};
pub use traits::{BookStorage, Connection, LendingUnitOfWork, LoanStorage, MemberStorage};
