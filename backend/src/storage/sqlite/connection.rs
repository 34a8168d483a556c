use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::storage::error::StorageResult;
use crate::storage::sqlite::repositories::{BookRepository, LoanRepository, MemberRepository};
use crate::storage::sqlite::unit_of_work::SqliteUnitOfWork;
use crate::storage::traits::Connection;

/// The database URL for the production database
pub const DEFAULT_DATABASE_URL: &str = "sqlite://librarian.db";

/// How long a statement waits on a locked database file before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool sizing knobs
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and make sure the schema exists
    pub async fn new(url: &str, settings: &PoolSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", url))?;

        Self::setup_schema(&pool).await?;
        info!("Database ready at {}", url);

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Fresh, private in-memory database.
    ///
    /// Every call gets its own database. The pool is pinned to one connection
    /// that is never recycled, because the data lives only as long as it does.
    pub async fn in_memory() -> Result<Self> {
        let db_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", db_id);
        let options = SqliteConnectOptions::from_str(&db_url)?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                stock INTEGER NOT NULL CHECK (stock >= 0),
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                borrowed_books_count INTEGER NOT NULL DEFAULT 0 CHECK (borrowed_books_count >= 0),
                is_penalized INTEGER NOT NULL DEFAULT 0,
                penalty_expires_at INTEGER,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Partial index used by the lapse sweep
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_members_penalty
            ON members(penalty_expires_at) WHERE is_penalized = 1;
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS loans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                book_id INTEGER NOT NULL REFERENCES books (id),
                member_id INTEGER NOT NULL REFERENCES members (id),
                created_at INTEGER NOT NULL,
                returned_at INTEGER
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Outstanding loans are looked up by (book, member) on every return
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_loans_outstanding
            ON loans(book_id, member_id, created_at) WHERE returned_at IS NULL;
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Connection for DbConnection {
    type BookRepository = BookRepository;
    type MemberRepository = MemberRepository;
    type LoanRepository = LoanRepository;
    type UnitOfWork = SqliteUnitOfWork;

    fn create_book_repository(&self) -> Self::BookRepository {
        BookRepository::new(self.clone())
    }

    fn create_member_repository(&self) -> Self::MemberRepository {
        MemberRepository::new(self.clone())
    }

    fn create_loan_repository(&self) -> Self::LoanRepository {
        LoanRepository::new(self.clone())
    }

    async fn begin(&self) -> StorageResult<Self::UnitOfWork> {
        SqliteUnitOfWork::begin(self.pool()).await
    }
}
