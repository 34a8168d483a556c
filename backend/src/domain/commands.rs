//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer is responsible for mapping the
//! public DTOs defined in the `shared` crate to these internal types.

pub mod books {
    /// Input for cataloguing a new book.
    #[derive(Debug, Clone)]
    pub struct CreateBookCommand {
        pub code: String,
        pub title: String,
        pub author: String,
        pub stock: i64,
    }

    /// Input for editing a book. `None` keeps the stored value.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateBookCommand {
        pub code: Option<String>,
        pub title: Option<String>,
        pub author: Option<String>,
        pub stock: Option<i64>,
    }

    /// Query parameters for listing books.
    #[derive(Debug, Clone, Default)]
    pub struct BookListQuery {
        pub min_stock: Option<i64>,
    }
}

pub mod members {
    /// Input for registering a new member.
    #[derive(Debug, Clone)]
    pub struct CreateMemberCommand {
        pub code: String,
        pub name: String,
    }

    /// Input for editing a member. `None` keeps the stored value.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateMemberCommand {
        pub code: Option<String>,
        pub name: Option<String>,
    }
}

pub mod lending {
    use chrono::{DateTime, Utc};

    use crate::domain::models::Loan;

    #[derive(Debug, Clone)]
    pub struct BorrowCommand {
        pub book_code: String,
        pub member_code: String,
    }

    #[derive(Debug, Clone)]
    pub struct ReturnCommand {
        pub book_code: String,
        pub member_code: String,
    }

    /// Result of returning a book.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ReturnOutcome {
        /// The loan as closed, with `returned_at` set
        pub loan: Loan,
        pub days_borrowed: i64,
        pub late: bool,
        pub penalty_until: Option<DateTime<Utc>>,
    }
}
