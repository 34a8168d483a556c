use async_trait::async_trait;

use crate::domain::models::{Book, BookChanges, NewBook};
use crate::storage::error::StorageResult;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::sqlite::rows::{book_from_row, to_millis, BOOK_COLUMNS};
use crate::storage::traits::BookStorage;

/// Repository for book operations
#[derive(Clone)]
pub struct BookRepository {
    db: DbConnection,
}

impl BookRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookStorage for BookRepository {
    async fn insert_book(&self, book: &NewBook) -> StorageResult<Book> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (code, title, author, stock, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&book.code)
        .bind(&book.title)
        .bind(&book.author)
        .bind(i64::from(book.stock))
        .bind(to_millis(book.created_at))
        .execute(self.db.pool())
        .await?;

        Ok(Book {
            id: result.last_insert_rowid(),
            code: book.code.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            stock: book.stock,
            created_at: book.created_at,
        })
    }

    async fn find_book_by_code(&self, code: &str) -> StorageResult<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {} FROM books WHERE code = ?", BOOK_COLUMNS))
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(book_from_row).transpose()
    }

    async fn find_book_by_id(&self, id: i64) -> StorageResult<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(book_from_row).transpose()
    }

    async fn list_books(&self, min_stock: Option<i64>) -> StorageResult<Vec<Book>> {
        let rows = if let Some(min_stock) = min_stock {
            sqlx::query(&format!(
                "SELECT {} FROM books WHERE stock >= ? ORDER BY id ASC",
                BOOK_COLUMNS
            ))
            .bind(min_stock)
            .fetch_all(self.db.pool())
            .await?
        } else {
            sqlx::query(&format!("SELECT {} FROM books ORDER BY id ASC", BOOK_COLUMNS))
                .fetch_all(self.db.pool())
                .await?
        };

        rows.iter().map(book_from_row).collect()
    }

    async fn update_book(&self, id: i64, changes: &BookChanges) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE books
            SET code = ?, title = ?, author = ?, stock = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.code)
        .bind(&changes.title)
        .bind(&changes.author)
        .bind(i64::from(changes.stock))
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }
}
