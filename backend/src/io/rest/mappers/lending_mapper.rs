//! backend/src/io/rest/mappers/lending_mapper.rs

use super::format_instant;
use crate::domain::commands::lending::{BorrowCommand, ReturnCommand, ReturnOutcome};
use crate::domain::models::Loan;
use shared::{BorrowBookRequest, BorrowedBook, ReturnBookRequest, ReturnedBook};

/// Mapper for the borrow and return endpoints. The book code comes from the
/// path, the member code from the body.
pub struct LendingMapper;

impl LendingMapper {
    pub fn to_borrow_command(book_code: String, request: BorrowBookRequest) -> BorrowCommand {
        BorrowCommand {
            book_code,
            member_code: request.member_code,
        }
    }

    pub fn to_return_command(book_code: String, request: ReturnBookRequest) -> ReturnCommand {
        ReturnCommand {
            book_code,
            member_code: request.member_code,
        }
    }

    pub fn to_borrowed_dto(command: BorrowCommand, loan: Loan) -> BorrowedBook {
        BorrowedBook {
            book_code: command.book_code,
            member_code: command.member_code,
            borrowed_at: format_instant(loan.created_at),
        }
    }

    pub fn to_returned_dto(command: ReturnCommand, outcome: ReturnOutcome) -> ReturnedBook {
        ReturnedBook {
            book_code: command.book_code,
            member_code: command.member_code,
            days_borrowed: outcome.days_borrowed,
            late: outcome.late,
            penalty_expires_at: outcome.penalty_until.map(format_instant),
        }
    }
}
