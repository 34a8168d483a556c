use async_trait::async_trait;

use crate::domain::models::Loan;
use crate::storage::error::StorageResult;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::sqlite::rows::{loan_from_row, LOAN_COLUMNS};
use crate::storage::traits::LoanStorage;

/// Read-side repository for loans. Loans are only written through a unit of work.
#[derive(Clone)]
pub struct LoanRepository {
    db: DbConnection,
}

impl LoanRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoanStorage for LoanRepository {
    async fn find_active_loan(&self, book_code: &str, member_code: &str) -> StorageResult<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT l.id, l.book_id, l.member_id, l.created_at, l.returned_at
            FROM loans l
            JOIN books b ON b.id = l.book_id
            JOIN members m ON m.id = l.member_id
            WHERE b.code = ?
              AND m.code = ?
              AND l.returned_at IS NULL
            ORDER BY l.created_at ASC, l.id ASC
            LIMIT 1
            "#,
        )
        .bind(book_code)
        .bind(member_code)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(loan_from_row).transpose()
    }

    async fn find_loan_by_id(&self, id: i64) -> StorageResult<Option<Loan>> {
        let row = sqlx::query(&format!("SELECT {} FROM loans WHERE id = ?", LOAN_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(loan_from_row).transpose()
    }

    async fn list_outstanding_loans(&self, member_id: i64) -> StorageResult<Vec<Loan>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM loans WHERE member_id = ? AND returned_at IS NULL ORDER BY created_at ASC, id ASC",
            LOAN_COLUMNS
        ))
        .bind(member_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(loan_from_row).collect()
    }
}
