//! Lending transaction engine.
//!
//! `borrow` and `return_book` each validate against a fresh read, then apply
//! their three writes (book stock, member counters, loan record) inside one
//! unit of work. The writes are guarded, so a request that lost a race to a
//! concurrent one is rolled back and reported as the rule it would have broken.
//!
//! Tables are always touched in the same order (books, members, loans) to keep
//! lock acquisition consistent between the two operations.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::lending::{BorrowCommand, ReturnCommand, ReturnOutcome};
use crate::domain::errors::{LendingRule, LibraryError, LibraryResult};
use crate::domain::models::Loan;
use crate::domain::penalty_policy::LendingPolicy;
use crate::storage::{BookStorage, Connection, LendingUnitOfWork, LoanStorage, MemberStorage};

pub struct LendingService<C: Connection> {
    connection: Arc<C>,
    book_repository: C::BookRepository,
    member_repository: C::MemberRepository,
    loan_repository: C::LoanRepository,
    clock: Arc<dyn Clock>,
    policy: LendingPolicy,
}

impl<C: Connection> LendingService<C> {
    pub fn new(connection: Arc<C>, clock: Arc<dyn Clock>, policy: LendingPolicy) -> Self {
        let book_repository = connection.create_book_repository();
        let member_repository = connection.create_member_repository();
        let loan_repository = connection.create_loan_repository();
        Self {
            connection,
            book_repository,
            member_repository,
            loan_repository,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    /// Lend one copy of a book to a member.
    ///
    /// Preconditions are checked in a fixed order and the first failure wins:
    /// unknown book, out of stock, unknown member, penalty flag, loan cap.
    pub async fn borrow(&self, command: BorrowCommand) -> LibraryResult<Loan> {
        info!("Borrow request: book {} by member {}", command.book_code, command.member_code);

        let book = self
            .book_repository
            .find_book_by_code(&command.book_code)
            .await?
            .ok_or_else(|| LibraryError::book_not_found(&command.book_code))?;
        book.check_lendable()?;

        let member = self
            .member_repository
            .find_member_by_code(&command.member_code)
            .await?
            .ok_or_else(|| LibraryError::member_not_found(&command.member_code))?;

        let now = self.clock.now();
        member.check_can_borrow(&self.policy)?;

        let mut uow = self.connection.begin().await?;

        if !uow.take_copy(book.id).await? {
            uow.rollback().await?;
            warn!("Book {} ran out of stock before the loan was recorded", book.code);
            return Err(LendingRule::OutOfStock.into());
        }

        if !uow.reserve_loan_slot(member.id, self.policy.max_concurrent_loans).await? {
            let rule = match uow.find_member_by_id(member.id).await? {
                Some(current) => current
                    .check_can_borrow(&self.policy)
                    .err()
                    .unwrap_or(LendingRule::MaxLoansReached),
                None => LendingRule::MaxLoansReached,
            };
            uow.rollback().await?;
            warn!("Member {} became ineligible before the loan was recorded: {}", member.code, rule);
            return Err(rule.into());
        }

        let loan = uow.insert_loan(book.id, member.id, now).await?;
        uow.commit().await?;

        info!(
            "Loan {} created: book {} to member {} at {}",
            loan.id, book.code, member.code, now
        );
        Ok(loan)
    }

    /// Close the outstanding loan for a (book, member) pair.
    ///
    /// A return later than the loan period penalizes the member; an on-time
    /// return clears any earlier penalty.
    pub async fn return_book(&self, command: ReturnCommand) -> LibraryResult<ReturnOutcome> {
        info!("Return request: book {} by member {}", command.book_code, command.member_code);

        let loan = self
            .loan_repository
            .find_active_loan(&command.book_code, &command.member_code)
            .await?
            .ok_or_else(|| loan_not_found(&command))?;

        let now = self.clock.now();
        let assessment = self.policy.assess_return(loan.created_at, now).map_err(|postdated| {
            warn!(
                "Loan {} was created at {}, after the return instant {}",
                loan.id, postdated.borrowed_at, postdated.returned_at
            );
            LibraryError::Integrity(format!(
                "loan {} was created at {}, which is after {}",
                loan.id, postdated.borrowed_at, postdated.returned_at
            ))
        })?;

        let mut uow = self.connection.begin().await?;

        if !uow.restore_copy(loan.book_id).await? {
            uow.rollback().await?;
            return Err(LibraryError::Integrity(format!(
                "book {} of loan {} no longer exists",
                loan.book_id, loan.id
            )));
        }

        if !uow.release_loan_slot(loan.member_id, assessment.penalty_until).await? {
            uow.rollback().await?;
            return Err(LibraryError::Integrity(format!(
                "member {} has an outstanding loan {} but no borrowed books",
                loan.member_id, loan.id
            )));
        }

        if !uow.close_loan(loan.id, now).await? {
            uow.rollback().await?;
            warn!("Loan {} was returned concurrently", loan.id);
            return Err(loan_not_found(&command));
        }

        uow.commit().await?;

        if let Some(until) = assessment.penalty_until {
            info!(
                "Book {} returned late by member {} after {} days; penalized until {}",
                command.book_code, command.member_code, assessment.days_borrowed, until
            );
        } else {
            info!(
                "Book {} returned by member {} after {} days",
                command.book_code, command.member_code, assessment.days_borrowed
            );
        }

        Ok(ReturnOutcome {
            loan: Loan { returned_at: Some(now), ..loan },
            days_borrowed: assessment.days_borrowed,
            late: assessment.late,
            penalty_until: assessment.penalty_until,
        })
    }
}

fn loan_not_found(command: &ReturnCommand) -> LibraryError {
    LibraryError::LoanNotFound {
        book_code: command.book_code.clone(),
        member_code: command.member_code.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book_service::BookService;
    use crate::domain::clock::ManualClock;
    use crate::domain::commands::books::{BookListQuery, CreateBookCommand};
    use crate::domain::commands::members::CreateMemberCommand;
    use crate::domain::errors::ErrorKind;
    use crate::domain::member_service::MemberService;
    use crate::domain::models::{Book, Member};
    use crate::storage::{DbConnection, PoolSettings};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    struct TestLibrary {
        db: Arc<DbConnection>,
        clock: Arc<ManualClock>,
        books: BookService<DbConnection>,
        members: MemberService<DbConnection>,
        lending: LendingService<DbConnection>,
    }

    impl TestLibrary {
        async fn book(&self, code: &str) -> Book {
            self.db.create_book_repository().find_book_by_code(code).await.unwrap().unwrap()
        }

        async fn member(&self, code: &str) -> Member {
            self.db.create_member_repository().find_member_by_code(code).await.unwrap().unwrap()
        }

        async fn outstanding(&self, member_code: &str) -> Vec<Loan> {
            let member = self.member(member_code).await;
            self.db.create_loan_repository().list_outstanding_loans(member.id).await.unwrap()
        }

        async fn add_book(&self, code: &str, stock: i64) {
            let command = CreateBookCommand {
                code: code.to_string(),
                title: format!("Title of {}", code),
                author: "Author".to_string(),
                stock,
            };
            self.books.create(command).await.unwrap();
        }

        async fn add_member(&self, code: &str) {
            let command = CreateMemberCommand { code: code.to_string(), name: format!("Member {}", code) };
            self.members.create(command).await.unwrap();
        }

        async fn borrow(&self, book_code: &str, member_code: &str) -> LibraryResult<Loan> {
            self.lending
                .borrow(BorrowCommand { book_code: book_code.to_string(), member_code: member_code.to_string() })
                .await
        }

        async fn give_back(&self, book_code: &str, member_code: &str) -> LibraryResult<ReturnOutcome> {
            self.lending
                .return_book(ReturnCommand { book_code: book_code.to_string(), member_code: member_code.to_string() })
                .await
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 8, 30, 0).unwrap()
    }

    async fn setup_test() -> TestLibrary {
        let db = Arc::new(DbConnection::in_memory().await.expect("Failed to create test database"));
        let clock = Arc::new(ManualClock::new(start()));
        TestLibrary {
            books: BookService::new(db.clone(), clock.clone()),
            members: MemberService::new(db.clone(), clock.clone()),
            lending: LendingService::new(db.clone(), clock.clone(), LendingPolicy::default()),
            db,
            clock,
        }
    }

    fn rule_of(result: LibraryResult<impl std::fmt::Debug>) -> LendingRule {
        match result {
            Err(LibraryError::RuleViolation(rule)) => rule,
            other => panic!("expected a rule violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_successful_borrow_moves_all_three_records() {
        let lib = setup_test().await;
        lib.add_book("JK-45", 2).await;
        lib.add_member("M001").await;

        let loan = lib.borrow("JK-45", "M001").await.unwrap();
        assert_eq!(loan.created_at, start());
        assert!(loan.is_outstanding());

        assert_eq!(lib.book("JK-45").await.stock, 1);
        assert_eq!(lib.member("M001").await.borrowed_books_count, 1);
        let outstanding = lib.outstanding("M001").await;
        assert_eq!(outstanding.len(), 1);
        assert_eq!(outstanding[0].id, loan.id);
    }

    #[tokio::test]
    async fn test_unknown_book_and_member() {
        let lib = setup_test().await;
        lib.add_book("JK-45", 1).await;
        lib.add_member("M001").await;

        assert!(matches!(lib.borrow("NOPE", "M001").await, Err(LibraryError::NotFound { .. })));
        match lib.borrow("JK-45", "NOPE").await {
            Err(LibraryError::NotFound { entity, code }) => {
                assert_eq!(entity.to_string(), "member");
                assert_eq!(code, "NOPE");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(lib.book("JK-45").await.stock, 1);
    }

    #[tokio::test]
    async fn test_out_of_stock_regardless_of_member() {
        let lib = setup_test().await;
        lib.add_book("EMPTY", 0).await;

        // Stock is checked before the member is even looked up
        assert_eq!(rule_of(lib.borrow("EMPTY", "UNKNOWN").await), LendingRule::OutOfStock);

        lib.add_member("M001").await;
        assert_eq!(rule_of(lib.borrow("EMPTY", "M001").await), LendingRule::OutOfStock);
        assert_eq!(lib.member("M001").await.borrowed_books_count, 0);
    }

    #[tokio::test]
    async fn test_third_borrow_hits_the_cap() {
        let lib = setup_test().await;
        for code in ["A", "B", "C"] {
            lib.add_book(code, 1).await;
        }
        lib.add_member("M001").await;

        lib.borrow("A", "M001").await.unwrap();
        lib.borrow("B", "M001").await.unwrap();
        assert_eq!(rule_of(lib.borrow("C", "M001").await), LendingRule::MaxLoansReached);

        assert_eq!(lib.book("C").await.stock, 1);
        assert_eq!(lib.member("M001").await.borrowed_books_count, 2);
        assert_eq!(lib.outstanding("M001").await.len(), 2);
    }

    #[tokio::test]
    async fn test_return_after_exactly_seven_days_is_on_time() {
        let lib = setup_test().await;
        lib.add_book("JK-45", 1).await;
        lib.add_member("M001").await;
        lib.borrow("JK-45", "M001").await.unwrap();

        lib.clock.advance(Duration::days(7) + Duration::hours(23));
        let outcome = lib.give_back("JK-45", "M001").await.unwrap();

        assert_eq!(outcome.days_borrowed, 7);
        assert!(!outcome.late);
        assert!(outcome.penalty_until.is_none());
        assert_eq!(outcome.loan.returned_at, Some(lib.clock.now()));
        let stored = lib.db.create_loan_repository().find_loan_by_id(outcome.loan.id).await.unwrap();
        assert_eq!(stored, Some(outcome.loan.clone()));

        let member = lib.member("M001").await;
        assert!(!member.is_penalized);
        assert_eq!(member.borrowed_books_count, 0);
        assert_eq!(lib.book("JK-45").await.stock, 1);
        assert!(lib.outstanding("M001").await.is_empty());
    }

    #[tokio::test]
    async fn test_return_after_eight_days_penalizes_for_three() {
        let lib = setup_test().await;
        lib.add_book("JK-45", 1).await;
        lib.add_book("OTHER", 1).await;
        lib.add_member("M001").await;
        lib.borrow("JK-45", "M001").await.unwrap();

        lib.clock.advance(Duration::days(8));
        let returned_at = lib.clock.now();
        let outcome = lib.give_back("JK-45", "M001").await.unwrap();

        assert_eq!(outcome.days_borrowed, 8);
        assert!(outcome.late);
        assert_eq!(outcome.penalty_until, Some(returned_at + Duration::days(3)));

        let member = lib.member("M001").await;
        assert!(member.is_penalized);
        assert_eq!(member.penalty_expires_at, Some(returned_at + Duration::days(3)));

        // Active penalty blocks borrowing even with stock available
        assert_eq!(rule_of(lib.borrow("OTHER", "M001").await), LendingRule::MemberPenalized);

    }

    #[tokio::test]
    async fn test_lapsed_penalty_blocks_until_swept() {
        let lib = setup_test().await;
        lib.add_book("JK-45", 1).await;
        lib.add_book("OTHER", 3).await;
        lib.add_member("M001").await;
        lib.borrow("JK-45", "M001").await.unwrap();

        lib.clock.advance(Duration::days(8));
        assert!(lib.give_back("JK-45", "M001").await.unwrap().late);

        // The window is over, but nothing has cleared the flag yet
        lib.clock.advance(Duration::days(3) + Duration::seconds(1));
        assert_eq!(rule_of(lib.borrow("OTHER", "M001").await), LendingRule::MemberPenalized);
        let member = lib.member("M001").await;
        assert!(member.is_penalized);
        assert_eq!(member.borrowed_books_count, 0);
        assert_eq!(lib.book("OTHER").await.stock, 3);

        let members = lib.members.list().await.unwrap();
        assert!(!members[0].is_penalized);

        lib.borrow("OTHER", "M001").await.unwrap();
        let member = lib.member("M001").await;
        assert!(!member.is_penalized);
        assert!(member.penalty_expires_at.is_none());
        assert_eq!(member.borrowed_books_count, 1);
    }

    #[tokio::test]
    async fn test_on_time_return_clears_an_earlier_penalty() {
        let lib = setup_test().await;
        lib.add_book("A", 1).await;
        lib.add_book("B", 1).await;
        lib.add_member("M001").await;

        lib.borrow("A", "M001").await.unwrap();
        lib.clock.advance(Duration::days(3));
        lib.borrow("B", "M001").await.unwrap();
        lib.clock.advance(Duration::days(6));

        assert!(lib.give_back("A", "M001").await.unwrap().late);
        assert!(lib.member("M001").await.is_penalized);

        let outcome = lib.give_back("B", "M001").await.unwrap();
        assert_eq!(outcome.days_borrowed, 6);
        assert!(!outcome.late);

        let member = lib.member("M001").await;
        assert!(!member.is_penalized);
        assert!(member.penalty_expires_at.is_none());
        assert_eq!(member.borrowed_books_count, 0);

        // Returning the same book twice finds no outstanding loan
        assert!(matches!(lib.give_back("B", "M001").await, Err(LibraryError::LoanNotFound { .. })));
        assert_eq!(lib.book("B").await.stock, 1);
    }

    #[tokio::test]
    async fn test_return_without_loan_mutates_nothing() {
        let lib = setup_test().await;
        lib.add_book("JK-45", 3).await;
        lib.add_member("M001").await;

        match lib.give_back("JK-45", "M001").await {
            Err(LibraryError::LoanNotFound { book_code, member_code }) => {
                assert_eq!(book_code, "JK-45");
                assert_eq!(member_code, "M001");
            }
            other => panic!("expected LoanNotFound, got {:?}", other),
        }

        assert_eq!(lib.book("JK-45").await.stock, 3);
        let member = lib.member("M001").await;
        assert_eq!(member.borrowed_books_count, 0);
        assert!(!member.is_penalized);
    }

    #[tokio::test]
    async fn test_postdated_loan_is_an_integrity_failure() {
        let lib = setup_test().await;
        lib.add_book("JK-45", 1).await;
        lib.add_member("M001").await;
        lib.borrow("JK-45", "M001").await.unwrap();

        lib.clock.set(start() - Duration::hours(1));
        let err = lib.give_back("JK-45", "M001").await.unwrap_err();
        assert!(matches!(err, LibraryError::Integrity(_)));
        assert_eq!(err.kind(), ErrorKind::Infrastructure);

        assert_eq!(lib.book("JK-45").await.stock, 0);
        assert_eq!(lib.member("M001").await.borrowed_books_count, 1);
        assert_eq!(lib.outstanding("M001").await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_borrows_of_last_copy() {
        let lib = setup_test().await;
        lib.add_book("LAST", 1).await;
        lib.add_member("M001").await;
        lib.add_member("M002").await;

        let (first, second) = tokio::join!(lib.borrow("LAST", "M001"), lib.borrow("LAST", "M002"));

        let outcomes = [first, second];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let failure = outcomes.into_iter().find(|r| r.is_err()).unwrap();
        assert_eq!(rule_of(failure), LendingRule::OutOfStock);

        assert_eq!(lib.book("LAST").await.stock, 0);
        let loans = lib.outstanding("M001").await.len() + lib.outstanding("M002").await.len();
        assert_eq!(loans, 1);
        let counts = lib.member("M001").await.borrowed_books_count + lib.member("M002").await.borrowed_books_count;
        assert_eq!(counts, 1);
    }

    #[tokio::test]
    async fn test_concurrent_borrows_on_a_shared_database_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let url = format!("sqlite://{}", temp_dir.path().join("library.db").display());
        let settings = PoolSettings { max_connections: 8, acquire_timeout: std::time::Duration::from_secs(30) };
        let db = Arc::new(DbConnection::new(&url, &settings).await.expect("Failed to open file database"));
        let clock = Arc::new(ManualClock::new(start()));

        let books = BookService::new(db.clone(), clock.clone());
        let members = MemberService::new(db.clone(), clock.clone());
        let lending = Arc::new(LendingService::new(db.clone(), clock.clone(), LendingPolicy::default()));

        let command = CreateBookCommand {
            code: "LAST".to_string(),
            title: "Last copy".to_string(),
            author: "Author".to_string(),
            stock: 1,
        };
        books.create(command).await.unwrap();
        for i in 0..8 {
            let command = CreateMemberCommand { code: format!("M{:03}", i), name: format!("Member {}", i) };
            members.create(command).await.unwrap();
        }

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let lending = lending.clone();
                tokio::spawn(async move {
                    lending
                        .borrow(BorrowCommand { book_code: "LAST".to_string(), member_code: format!("M{:03}", i) })
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                failure => assert_eq!(rule_of(failure), LendingRule::OutOfStock),
            }
        }
        assert_eq!(successes, 1);

        let book = db.create_book_repository().find_book_by_code("LAST").await.unwrap().unwrap();
        assert_eq!(book.stock, 0);
        let listed = members.list().await.unwrap();
        assert_eq!(listed.iter().map(|m| m.borrowed_books_count).sum::<u32>(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_borrows_respect_the_cap() {
        let lib = setup_test().await;
        for code in ["A", "B", "C"] {
            lib.add_book(code, 1).await;
        }
        lib.add_member("M001").await;
        lib.borrow("A", "M001").await.unwrap();

        let (first, second) = tokio::join!(lib.borrow("B", "M001"), lib.borrow("C", "M001"));
        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let failure = outcomes.into_iter().find(|r| r.is_err()).unwrap();
        assert_eq!(rule_of(failure), LendingRule::MaxLoansReached);

        assert_eq!(lib.member("M001").await.borrowed_books_count, 2);
        let stocks = lib.book("B").await.stock + lib.book("C").await.stock;
        assert_eq!(stocks, 1);
    }

    #[tokio::test]
    async fn test_custom_policy_boundaries() {
        let lib = setup_test().await;
        let policy = LendingPolicy { max_concurrent_loans: 1, loan_period_days: 1, penalty_days: 10 };
        let lending = LendingService::new(lib.db.clone(), lib.clock.clone(), policy);
        lib.add_book("A", 2).await;
        lib.add_member("M001").await;

        let borrow = || BorrowCommand { book_code: "A".to_string(), member_code: "M001".to_string() };
        lending.borrow(borrow()).await.unwrap();
        assert_eq!(rule_of(lending.borrow(borrow()).await), LendingRule::MaxLoansReached);

        lib.clock.advance(Duration::days(2));
        let outcome = lending
            .return_book(ReturnCommand { book_code: "A".to_string(), member_code: "M001".to_string() })
            .await
            .unwrap();
        assert!(outcome.late);
        assert_eq!(outcome.penalty_until, Some(lib.clock.now() + Duration::days(10)));
        assert_eq!(lending.policy().penalty_days, 10);
        assert_eq!(lib.books.list(BookListQuery::default()).await.unwrap()[0].stock, 2);
    }

    #[tokio::test]
    async fn test_duplicate_outstanding_loans_return_oldest_first() {
        let lib = setup_test().await;
        lib.add_book("A", 2).await;
        lib.add_member("M001").await;

        let first = lib.borrow("A", "M001").await.unwrap();
        lib.clock.advance(Duration::days(2));
        let second = lib.borrow("A", "M001").await.unwrap();
        lib.clock.advance(Duration::days(6));

        let outcome = lib.give_back("A", "M001").await.unwrap();
        assert_eq!(outcome.loan.id, first.id);
        assert!(outcome.late);

        let remaining = lib.outstanding("M001").await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second.id);
    }
}
