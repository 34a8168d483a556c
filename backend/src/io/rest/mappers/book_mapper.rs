//! backend/src/io/rest/mappers/book_mapper.rs

use crate::domain::commands::books::{BookListQuery, CreateBookCommand, UpdateBookCommand};
use crate::domain::models::Book as DomainBook;
use shared::{Book as SharedBook, BookListRequest, CreateBookRequest, UpdateBookRequest};

/// Mapper between shared Book DTOs and domain book types.
pub struct BookMapper;

impl BookMapper {
    pub fn to_create_command(request: CreateBookRequest) -> CreateBookCommand {
        CreateBookCommand {
            code: request.code,
            title: request.title,
            author: request.author,
            stock: request.stock,
        }
    }

    pub fn to_update_command(request: UpdateBookRequest) -> UpdateBookCommand {
        UpdateBookCommand {
            code: request.code,
            title: request.title,
            author: request.author,
            stock: request.stock,
        }
    }

    pub fn to_list_query(request: BookListRequest) -> BookListQuery {
        BookListQuery { min_stock: request.min_stock }
    }

    /// Converts a domain Book to its public DTO. The surrogate id stays internal.
    pub fn to_dto(domain: DomainBook) -> SharedBook {
        SharedBook {
            code: domain.code,
            title: domain.title,
            author: domain.author,
            stock: domain.stock,
        }
    }

    pub fn to_list_dto(books: Vec<DomainBook>) -> Vec<SharedBook> {
        books.into_iter().map(Self::to_dto).collect()
    }
}
