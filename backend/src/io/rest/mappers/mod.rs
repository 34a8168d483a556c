//! Conversions between the `shared` DTOs and domain types.

pub mod book_mapper;
pub mod lending_mapper;
pub mod member_mapper;

pub use book_mapper::BookMapper;
pub use lending_mapper::LendingMapper;
pub use member_mapper::MemberMapper;

use chrono::{DateTime, SecondsFormat, Utc};

/// Instants leave the API as RFC 3339 UTC strings with millisecond precision
pub(crate) fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
