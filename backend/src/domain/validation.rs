//! Input checks shared by the catalog and directory services.

use crate::domain::errors::{LibraryError, LibraryResult};

pub(crate) fn require_text(field: &'static str, value: &str) -> LibraryResult<()> {
    if value.trim().is_empty() {
        return Err(LibraryError::InvalidInput { field, reason: "must not be blank" });
    }
    Ok(())
}

pub(crate) fn require_stock(value: i64) -> LibraryResult<u32> {
    if value < 0 {
        return Err(LibraryError::InvalidInput { field: "stock", reason: "must not be negative" });
    }
    u32::try_from(value).map_err(|_| LibraryError::InvalidInput { field: "stock", reason: "is too large" })
}
