//! SQLite implementation of the lending transaction.
//!
//! Each write re-checks its precondition in the WHERE clause, so a stale read
//! taken before `begin` can never push a counter past its bounds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::domain::models::{Loan, Member};
use crate::storage::error::StorageResult;
use crate::storage::sqlite::rows::{member_from_row, to_millis, MEMBER_COLUMNS};
use crate::storage::traits::LendingUnitOfWork;

pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteUnitOfWork {
    pub(crate) async fn begin(pool: &SqlitePool) -> StorageResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }
}

#[async_trait]
impl LendingUnitOfWork for SqliteUnitOfWork {
    async fn take_copy(&mut self, book_id: i64) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE books SET stock = stock - 1 WHERE id = ? AND stock > 0")
            .bind(book_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn restore_copy(&mut self, book_id: i64) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE books SET stock = stock + 1 WHERE id = ?")
            .bind(book_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn reserve_loan_slot(&mut self, member_id: i64, max_loans: u32) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET borrowed_books_count = borrowed_books_count + 1
            WHERE id = ?
              AND borrowed_books_count < ?
              AND is_penalized = 0
            "#,
        )
        .bind(member_id)
        .bind(i64::from(max_loans))
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_loan_slot(&mut self, member_id: i64, penalty_until: Option<DateTime<Utc>>) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET borrowed_books_count = borrowed_books_count - 1,
                is_penalized = ?,
                penalty_expires_at = ?
            WHERE id = ?
              AND borrowed_books_count > 0
            "#,
        )
        .bind(penalty_until.is_some())
        .bind(penalty_until.map(to_millis))
        .bind(member_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_loan(&mut self, book_id: i64, member_id: i64, borrowed_at: DateTime<Utc>) -> StorageResult<Loan> {
        let result = sqlx::query(
            r#"
            INSERT INTO loans (book_id, member_id, created_at, returned_at)
            VALUES (?, ?, ?, NULL)
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .bind(to_millis(borrowed_at))
        .execute(&mut *self.tx)
        .await?;

        Ok(Loan {
            id: result.last_insert_rowid(),
            book_id,
            member_id,
            created_at: borrowed_at,
            returned_at: None,
        })
    }

    async fn close_loan(&mut self, loan_id: i64, returned_at: DateTime<Utc>) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE loans SET returned_at = ? WHERE id = ? AND returned_at IS NULL")
            .bind(to_millis(returned_at))
            .bind(loan_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_member_by_id(&mut self, member_id: i64) -> StorageResult<Option<Member>> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS))
            .bind(member_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn commit(self) -> StorageResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
