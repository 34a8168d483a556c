//! Lending limits and the late-return penalty rule.
//!
//! The three numbers below are the entire tunable surface of the lending
//! rules. Everything else in the engine reads them through `LendingPolicy`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How many books a member may hold at once
pub const MAX_CONCURRENT_LOANS: u32 = 2;
/// Whole days a book may be kept before the return counts as late
pub const LOAN_PERIOD_DAYS: i64 = 7;
/// Length of the borrowing ban applied after a late return
pub const PENALTY_DAYS: i64 = 3;
/// Upper bound accepted for either day count (about a century)
pub const MAX_POLICY_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingPolicy {
    pub max_concurrent_loans: u32,
    pub loan_period_days: i64,
    pub penalty_days: i64,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self {
            max_concurrent_loans: MAX_CONCURRENT_LOANS,
            loan_period_days: LOAN_PERIOD_DAYS,
            penalty_days: PENALTY_DAYS,
        }
    }
}

/// What a return at a given instant means for the member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnAssessment {
    pub days_borrowed: i64,
    pub late: bool,
    pub penalty_until: Option<DateTime<Utc>>,
}

/// The loan claims to start after the return instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostdatedLoan {
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: DateTime<Utc>,
}

impl LendingPolicy {
    pub fn is_late(&self, days_borrowed: i64) -> bool {
        days_borrowed > self.loan_period_days
    }

    /// Saturates at the latest representable instant instead of overflowing
    pub fn penalty_window(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(self.penalty_days)
            .and_then(|window| now.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whole days elapsed, truncated, so 7 days 23 hours counts as 7
    pub fn assess_return(
        &self,
        borrowed_at: DateTime<Utc>,
        returned_at: DateTime<Utc>,
    ) -> Result<ReturnAssessment, PostdatedLoan> {
        if borrowed_at > returned_at {
            return Err(PostdatedLoan { borrowed_at, returned_at });
        }

        let days_borrowed = (returned_at - borrowed_at).num_days();
        let late = self.is_late(days_borrowed);

        Ok(ReturnAssessment {
            days_borrowed,
            late,
            penalty_until: late.then(|| self.penalty_window(returned_at)),
        })
    }
}
