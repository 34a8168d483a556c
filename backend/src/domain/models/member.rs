use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::LendingRule;
use crate::domain::penalty_policy::LendingPolicy;

/// A library member with their running loan count and penalty state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub borrowed_books_count: u32,
    pub is_penalized: bool,
    pub penalty_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Penalty first, then the loan cap.
    ///
    /// The flag alone decides; a lapsed window still blocks until it is swept.
    pub fn check_can_borrow(&self, policy: &LendingPolicy) -> Result<(), LendingRule> {
        if self.is_penalized {
            return Err(LendingRule::MemberPenalized);
        }
        if self.borrowed_books_count >= policy.max_concurrent_loans {
            return Err(LendingRule::MaxLoansReached);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberChanges {
    pub code: String,
    pub name: String,
}

impl MemberChanges {
    pub fn from_existing(member: &Member) -> Self {
        Self {
            code: member.code.clone(),
            name: member.name.clone(),
        }
    }
}
