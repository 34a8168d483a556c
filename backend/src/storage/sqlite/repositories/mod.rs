// Repository modules
pub mod book_repository;
pub mod loan_repository;
pub mod member_repository;

// Re-export repository types
pub use book_repository::BookRepository;
pub use loan_repository::LoanRepository;
pub use member_repository::MemberRepository;
