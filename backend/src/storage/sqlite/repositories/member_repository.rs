use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::{Member, MemberChanges, NewMember};
use crate::storage::error::StorageResult;
use crate::storage::sqlite::connection::DbConnection;
use crate::storage::sqlite::rows::{member_from_row, to_millis, MEMBER_COLUMNS};
use crate::storage::traits::MemberStorage;

/// Repository for member operations
#[derive(Clone)]
pub struct MemberRepository {
    db: DbConnection,
}

impl MemberRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MemberStorage for MemberRepository {
    async fn insert_member(&self, member: &NewMember) -> StorageResult<Member> {
        let result = sqlx::query(
            r#"
            INSERT INTO members (code, name, borrowed_books_count, is_penalized, penalty_expires_at, created_at)
            VALUES (?, ?, 0, 0, NULL, ?)
            "#,
        )
        .bind(&member.code)
        .bind(&member.name)
        .bind(to_millis(member.created_at))
        .execute(self.db.pool())
        .await?;

        Ok(Member {
            id: result.last_insert_rowid(),
            code: member.code.clone(),
            name: member.name.clone(),
            borrowed_books_count: 0,
            is_penalized: false,
            penalty_expires_at: None,
            created_at: member.created_at,
        })
    }

    async fn find_member_by_code(&self, code: &str) -> StorageResult<Option<Member>> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE code = ?", MEMBER_COLUMNS))
            .bind(code)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn find_member_by_id(&self, id: i64) -> StorageResult<Option<Member>> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(member_from_row).transpose()
    }

    async fn list_members(&self) -> StorageResult<Vec<Member>> {
        let rows = sqlx::query(&format!("SELECT {} FROM members ORDER BY id ASC", MEMBER_COLUMNS))
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(member_from_row).collect()
    }

    async fn update_member(&self, id: i64, changes: &MemberChanges) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE members
            SET code = ?, name = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.code)
        .bind(&changes.name)
        .bind(id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn lapse_expired_penalties(&self, now: DateTime<Utc>) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET is_penalized = 0, penalty_expires_at = NULL
            WHERE is_penalized = 1
              AND penalty_expires_at IS NOT NULL
              AND penalty_expires_at <= ?
            "#,
        )
        .bind(to_millis(now))
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected())
    }
}
