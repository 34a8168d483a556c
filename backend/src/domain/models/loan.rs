use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One borrowing of a book by a member.
///
/// Outstanding while `returned_at` is `None`; returning is one-way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Loan {
    pub id: i64,
    pub book_id: i64,
    pub member_id: i64,
    pub created_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_outstanding(&self) -> bool {
        self.returned_at.is_none()
    }
}
