//! # REST API Interface Layer
//!
//! HTTP endpoints for the library. Handlers map the `shared` DTOs to domain
//! commands, call one service, and wrap the result in the
//! `{data, statusCode, message}` envelope.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: books, members, borrow and return
//! - **Error Handling**: converting [`crate::domain::LibraryError`] to status
//!   codes in one place ([`error::ApiError`])
//! - **Logging**: every handler logs its route on entry

pub mod book_apis;
pub mod error;
pub mod mappers;
pub mod member_apis;

pub use book_apis::{borrow_book, create_book, list_books, return_book, update_book};
pub use error::ApiError;
pub use member_apis::{create_member, list_members, update_member};
