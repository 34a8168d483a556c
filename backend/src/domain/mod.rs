//! # Domain Module
//!
//! Contains the business rules of the library: the book catalog, the member
//! directory, and the lending engine that moves copies between them.
//!
//! ## Key Responsibilities
//!
//! - **Catalog**: unique book codes, non-negative stock
//! - **Directory**: unique member codes, penalty lapse on listing
//! - **Lending**: borrow and return as single atomic transitions across the
//!   book, the member and the loan record
//! - **Penalty Policy**: loan period, loan cap and penalty window
//!
//! Services are generic over [`crate::storage::Connection`] and read time
//! through a [`clock::Clock`], so tests can pin both the store and the instant.

pub mod book_service;
pub mod clock;
pub mod commands;
pub mod errors;
pub mod lending_service;
pub mod member_service;
pub mod models;
pub mod penalty_policy;

mod validation;

pub use book_service::BookService;
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{EntityKind, ErrorKind, LendingRule, LibraryError, LibraryResult};
pub use lending_service::LendingService;
pub use member_service::MemberService;
pub use penalty_policy::LendingPolicy;
