use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::LendingRule;

/// A catalogued title and the number of copies currently on the shelf
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// A copy can only be lent while at least one is on the shelf
    pub fn check_lendable(&self) -> Result<(), LendingRule> {
        if self.stock == 0 {
            return Err(LendingRule::OutOfStock);
        }
        Ok(())
    }
}

/// Fields of a book that does not exist yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}

/// Fully resolved editable fields written by an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookChanges {
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: u32,
}

impl BookChanges {
    /// Start from the stored values so omitted fields are preserved
    pub fn from_existing(book: &Book) -> Self {
        Self {
            code: book.code.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            stock: book.stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with_stock(stock: u32) -> Book {
        Book {
            id: 1,
            code: "ABC123".to_string(),
            title: "Harry Potter".to_string(),
            author: "J.K. Rowling".to_string(),
            stock,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_shelf_is_not_lendable() {
        assert_eq!(book_with_stock(0).check_lendable(), Err(LendingRule::OutOfStock));
        assert_eq!(book_with_stock(1).check_lendable(), Ok(()));
    }

    #[test]
    fn test_changes_start_from_existing_values() {
        let book = book_with_stock(4);
        let changes = BookChanges::from_existing(&book);

        assert_eq!(changes.code, "ABC123");
        assert_eq!(changes.stock, 4);
    }
}
