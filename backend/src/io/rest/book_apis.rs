//! # REST API for the Book Catalog and Lending
//!
//! Endpoints for cataloguing books, listing and editing them, and the borrow
//! and return operations that are addressed by book code.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::info;

use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::{BookMapper, LendingMapper};
use crate::AppState;
use shared::{
    ApiResponse, BookListRequest, BorrowBookRequest, CreateBookRequest, CreatedCode, ReturnBookRequest,
    UpdateBookRequest,
};

/// Create a new book
pub async fn create_book(
    State(state): State<AppState>,
    Json(request): Json<CreateBookRequest>,
) -> impl IntoResponse {
    info!("POST /api/books - request: {:?}", request);

    match state.book_service.create(BookMapper::to_create_command(request)).await {
        Ok(code) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_data(StatusCode::CREATED.as_u16(), "Book created", CreatedCode { code })),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List books, optionally only those with at least `min_stock` copies
pub async fn list_books(
    State(state): State<AppState>,
    Query(request): Query<BookListRequest>,
) -> impl IntoResponse {
    info!("GET /api/books - query: {:?}", request);

    match state.book_service.list(BookMapper::to_list_query(request)).await {
        Ok(books) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(StatusCode::OK.as_u16(), "Books retrieved", BookMapper::to_list_dto(books))),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Partially update a book
pub async fn update_book(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<UpdateBookRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/books/{} - request: {:?}", code, request);

    match state.book_service.update_by_code(&code, BookMapper::to_update_command(request)).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::<()>::empty(StatusCode::OK.as_u16(), "Book updated"))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Borrow one copy of a book
pub async fn borrow_book(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<BorrowBookRequest>,
) -> impl IntoResponse {
    info!("POST /api/books/{}/borrow - request: {:?}", code, request);

    let command = LendingMapper::to_borrow_command(code, request);
    match state.lending_service.borrow(command.clone()).await {
        Ok(loan) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_data(
                StatusCode::CREATED.as_u16(),
                "Book borrowed",
                LendingMapper::to_borrowed_dto(command, loan),
            )),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Return a borrowed book
pub async fn return_book(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<ReturnBookRequest>,
) -> impl IntoResponse {
    info!("POST /api/books/{}/return - request: {:?}", code, request);

    let command = LendingMapper::to_return_command(code, request);
    match state.lending_service.return_book(command.clone()).await {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(ApiResponse::with_data(
                StatusCode::CREATED.as_u16(),
                "Book returned",
                LendingMapper::to_returned_dto(command, outcome),
            )),
        )
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
