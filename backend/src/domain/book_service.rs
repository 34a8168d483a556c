//! Book catalog service.
//!
//! Owns the catalog rules: codes are unique, text fields are never blank and
//! stock never goes below zero. Stock only changes here through an explicit
//! edit; lending moves it through [`crate::domain::LendingService`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::books::{BookListQuery, CreateBookCommand, UpdateBookCommand};
use crate::domain::errors::{EntityKind, LibraryError, LibraryResult};
use crate::domain::models::{Book, BookChanges, NewBook};
use crate::domain::validation::{require_stock, require_text};
use crate::storage::{BookStorage, Connection, StorageError};

pub struct BookService<C: Connection> {
    book_repository: C::BookRepository,
    clock: Arc<dyn Clock>,
}

impl<C: Connection> BookService<C> {
    pub fn new(connection: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        let book_repository = connection.create_book_repository();
        Self { book_repository, clock }
    }

    /// Catalogue a new book and return its code
    pub async fn create(&self, command: CreateBookCommand) -> LibraryResult<String> {
        info!("Creating book: {:?}", command);

        require_text("code", &command.code)?;
        require_text("title", &command.title)?;
        require_text("author", &command.author)?;
        let stock = require_stock(command.stock)?;

        if self.book_repository.find_book_by_code(&command.code).await?.is_some() {
            warn!("Book code {} is already taken", command.code);
            return Err(conflict(command.code));
        }

        let new_book = NewBook {
            code: command.code,
            title: command.title,
            author: command.author,
            stock,
            created_at: self.clock.now(),
        };

        match self.book_repository.insert_book(&new_book).await {
            Ok(book) => {
                info!("Created book {} with id {}", book.code, book.id);
                Ok(book.code)
            }
            Err(StorageError::UniqueViolation(_)) => {
                warn!("Book code {} was taken concurrently", new_book.code);
                Err(conflict(new_book.code))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self, query: BookListQuery) -> LibraryResult<Vec<Book>> {
        let books = self.book_repository.list_books(query.min_stock).await?;
        info!("Listed {} books (min_stock: {:?})", books.len(), query.min_stock);
        Ok(books)
    }

    /// Apply a partial edit to the book identified by `code`.
    ///
    /// Lookup happens before validation, so an unknown code is reported as
    /// NotFound even when the edit itself is also invalid.
    pub async fn update_by_code(&self, code: &str, command: UpdateBookCommand) -> LibraryResult<()> {
        info!("Updating book {}: {:?}", code, command);

        let book = self
            .book_repository
            .find_book_by_code(code)
            .await?
            .ok_or_else(|| LibraryError::book_not_found(code))?;

        let mut changes = BookChanges::from_existing(&book);
        if let Some(new_code) = command.code {
            require_text("code", &new_code)?;
            changes.code = new_code;
        }
        if let Some(title) = command.title {
            require_text("title", &title)?;
            changes.title = title;
        }
        if let Some(author) = command.author {
            require_text("author", &author)?;
            changes.author = author;
        }
        if let Some(stock) = command.stock {
            changes.stock = require_stock(stock)?;
        }

        if changes.code != book.code {
            if let Some(holder) = self.book_repository.find_book_by_code(&changes.code).await? {
                if holder.id != book.id {
                    warn!("Cannot rename book {} to {}: code is taken", book.code, changes.code);
                    return Err(conflict(changes.code));
                }
            }
        }

        match self.book_repository.update_book(book.id, &changes).await {
            Ok(()) => {
                info!("Updated book {} (now {})", code, changes.code);
                Ok(())
            }
            Err(StorageError::UniqueViolation(_)) => Err(conflict(changes.code)),
            Err(e) => Err(e.into()),
        }
    }
}

fn conflict(code: String) -> LibraryError {
    LibraryError::Conflict { entity: EntityKind::Book, code }
}
