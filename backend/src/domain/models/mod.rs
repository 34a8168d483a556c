pub mod book;
pub mod loan;
pub mod member;

pub use book::{Book, BookChanges, NewBook};
pub use loan::Loan;
pub use member::{Member, MemberChanges, NewMember};
