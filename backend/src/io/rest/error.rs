//! Translation of domain failures into HTTP responses.
//!
//! This is the only place that knows about status codes. Infrastructure
//! failures are logged in full here and reported to the client with a generic
//! message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use tracing::{error, warn};

use crate::domain::{EntityKind, LendingRule, LibraryError};

const INTERNAL_MESSAGE: &str = "Internal server error";
const UNAVAILABLE_MESSAGE: &str = "Storage is busy, please retry";

/// Wrapper that lets handlers return a [`LibraryError`] as a response
#[derive(Debug)]
pub struct ApiError(pub LibraryError);

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LibraryError::NotFound { .. } | LibraryError::LoanNotFound { .. } => StatusCode::NOT_FOUND,
            LibraryError::Conflict { .. } => StatusCode::CONFLICT,
            LibraryError::RuleViolation(_) => StatusCode::FORBIDDEN,
            LibraryError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            err if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            LibraryError::Integrity(_) | LibraryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable kind placed in the `error` field
    pub fn kind(&self) -> &'static str {
        match &self.0 {
            LibraryError::NotFound { .. } => "not_found",
            LibraryError::LoanNotFound { .. } => "loan_not_found",
            LibraryError::Conflict { .. } => "conflict",
            LibraryError::RuleViolation(rule) => rule.as_str(),
            LibraryError::InvalidInput { .. } => "invalid_input",
            err if err.is_retryable() => "unavailable",
            LibraryError::Integrity(_) | LibraryError::Storage(_) => "internal",
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            LibraryError::NotFound { entity, code } => format!("{} with code {} not found", title(*entity), code),
            LibraryError::LoanNotFound { book_code, member_code } => {
                format!("Book with code {} is not borrowed by member {}", book_code, member_code)
            }
            LibraryError::Conflict { entity, code } => format!("{} with code {} already exists", title(*entity), code),
            LibraryError::RuleViolation(LendingRule::OutOfStock) => "Book is out of stock".to_string(),
            LibraryError::RuleViolation(LendingRule::MemberPenalized) => "Member is currently penalized".to_string(),
            LibraryError::RuleViolation(LendingRule::MaxLoansReached) => {
                "Member has reached the maximum number of borrowed books".to_string()
            }
            LibraryError::InvalidInput { field, reason } => format!("Field {} {}", field, reason),
            err if err.is_retryable() => UNAVAILABLE_MESSAGE.to_string(),
            LibraryError::Integrity(_) | LibraryError::Storage(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

fn title(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Book => "Book",
        EntityKind::Member => "Member",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            status_code: status.as_u16(),
            error: self.kind().to_string(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
