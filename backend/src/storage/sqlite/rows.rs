//! Row <-> domain conversions shared by the repositories and the unit of work.
//!
//! Instants are stored as epoch milliseconds; counters as INTEGER.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{Book, Loan, Member};
use crate::storage::error::{StorageError, StorageResult};

pub(crate) const BOOK_COLUMNS: &str = "id, code, title, author, stock, created_at";

pub(crate) const MEMBER_COLUMNS: &str =
    "id, code, name, borrowed_books_count, is_penalized, penalty_expires_at, created_at";

pub(crate) const LOAN_COLUMNS: &str = "id, book_id, member_id, created_at, returned_at";

pub(crate) fn to_millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

fn from_millis(millis: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StorageError::Corrupt(format!("timestamp out of range: {}", millis)))
}

fn to_count(value: i64, column: &str) -> StorageResult<u32> {
    u32::try_from(value).map_err(|_| StorageError::Corrupt(format!("{} holds {}", column, value)))
}

pub(crate) fn book_from_row(row: &SqliteRow) -> StorageResult<Book> {
    Ok(Book {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        stock: to_count(row.try_get("stock")?, "books.stock")?,
        created_at: from_millis(row.try_get("created_at")?)?,
    })
}

pub(crate) fn member_from_row(row: &SqliteRow) -> StorageResult<Member> {
    let penalty_expires_at: Option<i64> = row.try_get("penalty_expires_at")?;

    Ok(Member {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        borrowed_books_count: to_count(row.try_get("borrowed_books_count")?, "members.borrowed_books_count")?,
        is_penalized: row.try_get("is_penalized")?,
        penalty_expires_at: penalty_expires_at.map(from_millis).transpose()?,
        created_at: from_millis(row.try_get("created_at")?)?,
    })
}

pub(crate) fn loan_from_row(row: &SqliteRow) -> StorageResult<Loan> {
    let returned_at: Option<i64> = row.try_get("returned_at")?;

    Ok(Loan {
        id: row.try_get("id")?,
        book_id: row.try_get("book_id")?,
        member_id: row.try_get("member_id")?,
        created_at: from_millis(row.try_get("created_at")?)?,
        returned_at: returned_at.map(from_millis).transpose()?,
    })
}
