//! # SQLite Storage Module
//!
//! This module contains the SQLite-based storage implementation.
//!
//! ## Components
//!
//! - **connection.rs** - pool setup, schema, and the `Connection` impl
//! - **repositories/** - read and single-row write operations per table
//! - **unit_of_work.rs** - the transaction behind `borrow` and `return`
//! - **rows.rs** - row to domain model conversion

pub mod connection;
pub mod repositories;
pub mod unit_of_work;

mod rows;

// Re-export the main types for external use
pub use connection::{DbConnection, PoolSettings};
pub use repositories::{BookRepository, LoanRepository, MemberRepository};
pub use unit_of_work::SqliteUnitOfWork;
