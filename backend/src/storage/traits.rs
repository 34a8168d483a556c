//! # Storage Traits
//!
//! This module defines the storage abstraction traits the domain services are
//! written against. The services never see SQL; they only see these traits,
//! so a different backend can be swapped in without touching business rules.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::{Book, BookChanges, Loan, Member, MemberChanges, NewBook, NewMember};
use crate::storage::error::StorageResult;

/// Trait defining the interface for book storage operations
#[async_trait]
pub trait BookStorage: Send + Sync {
    /// Insert a new book and return the stored row
    async fn insert_book(&self, book: &NewBook) -> StorageResult<Book>;

    /// Retrieve a book by its unique code
    async fn find_book_by_code(&self, code: &str) -> StorageResult<Option<Book>>;

    /// Retrieve a book by its surrogate id
    async fn find_book_by_id(&self, id: i64) -> StorageResult<Option<Book>>;

    /// List books in insertion order, optionally keeping only `stock >= min_stock`
    async fn list_books(&self, min_stock: Option<i64>) -> StorageResult<Vec<Book>>;

    /// Overwrite the editable fields of a book
    async fn update_book(&self, id: i64, changes: &BookChanges) -> StorageResult<()>;
}

/// Trait defining the interface for member storage operations
#[async_trait]
pub trait MemberStorage: Send + Sync {
    /// Insert a new member with no loans and no penalty
    async fn insert_member(&self, member: &NewMember) -> StorageResult<Member>;

    /// Retrieve a member by its unique code
    async fn find_member_by_code(&self, code: &str) -> StorageResult<Option<Member>>;

    /// Retrieve a member by its surrogate id
    async fn find_member_by_id(&self, id: i64) -> StorageResult<Option<Member>>;

    /// List all members in insertion order
    async fn list_members(&self) -> StorageResult<Vec<Member>>;

    /// Overwrite the editable fields of a member
    async fn update_member(&self, id: i64, changes: &MemberChanges) -> StorageResult<()>;

    /// Clear every penalty whose expiration is at or before `now`.
    /// Returns the number of members cleared.
    async fn lapse_expired_penalties(&self, now: DateTime<Utc>) -> StorageResult<u64>;
}

/// Trait defining the interface for loan lookups outside a transaction
#[async_trait]
pub trait LoanStorage: Send + Sync {
    /// Find the outstanding loan for a (book code, member code) pair.
    /// When several are outstanding the earliest `created_at` wins, then the lowest id.
    async fn find_active_loan(&self, book_code: &str, member_code: &str) -> StorageResult<Option<Loan>>;

    /// Retrieve a loan by id, outstanding or not
    async fn find_loan_by_id(&self, id: i64) -> StorageResult<Option<Loan>>;

    /// All outstanding loans of a member, oldest first
    async fn list_outstanding_loans(&self, member_id: i64) -> StorageResult<Vec<Loan>>;
}

/// Transactional handle for the writes of one lending operation.
///
/// Every mutation is a guarded conditional update: it re-checks its
/// precondition in the same statement and reports `false` when no row
/// qualified. Nothing is visible to other readers until `commit`; dropping
/// the handle without committing rolls everything back.
#[async_trait]
pub trait LendingUnitOfWork: Send {
    /// Decrement stock by one if it is still positive
    async fn take_copy(&mut self, book_id: i64) -> StorageResult<bool>;

    /// Increment stock by one. `false` if the book no longer exists.
    async fn restore_copy(&mut self, book_id: i64) -> StorageResult<bool>;

    /// Increment the member's loan count if it is below `max_loans` and the
    /// member is not penalized. Penalty columns are left untouched.
    async fn reserve_loan_slot(&mut self, member_id: i64, max_loans: u32) -> StorageResult<bool>;

    /// Decrement the member's loan count (guarded `> 0`) and overwrite the
    /// penalty state: `Some(until)` penalizes, `None` clears.
    async fn release_loan_slot(&mut self, member_id: i64, penalty_until: Option<DateTime<Utc>>) -> StorageResult<bool>;

    /// Record a new outstanding loan
    async fn insert_loan(&mut self, book_id: i64, member_id: i64, borrowed_at: DateTime<Utc>) -> StorageResult<Loan>;

    /// Mark an outstanding loan returned. `false` if it was already returned.
    async fn close_loan(&mut self, loan_id: i64, returned_at: DateTime<Utc>) -> StorageResult<bool>;

    /// Read a member through the transaction
    async fn find_member_by_id(&mut self, member_id: i64) -> StorageResult<Option<Member>>;

    async fn commit(self) -> StorageResult<()>;

    async fn rollback(self) -> StorageResult<()>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides
/// factory methods for creating repositories and units of work, so the
/// domain layer works with any storage backend.
#[async_trait]
pub trait Connection: Send + Sync + Clone + 'static {
    type BookRepository: BookStorage;
    type MemberRepository: MemberStorage;
    type LoanRepository: LoanStorage;
    type UnitOfWork: LendingUnitOfWork;

    fn create_book_repository(&self) -> Self::BookRepository;

    fn create_member_repository(&self) -> Self::MemberRepository;

    fn create_loan_repository(&self) -> Self::LoanRepository;

    /// Open a transaction for one lending operation
    async fn begin(&self) -> StorageResult<Self::UnitOfWork>;
}
