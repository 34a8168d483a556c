use serde::{Deserialize, Serialize};

/// Envelope wrapping every successful API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Payload, absent for operations that return nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// HTTP status code mirrored in the body
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Human-readable summary of the outcome
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn with_data(status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            data: Some(data),
            status_code,
            message: message.into(),
        }
    }

    pub fn empty(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            data: None,
            status_code,
            message: message.into(),
        }
    }
}

/// Body returned for every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Machine-readable failure kind, e.g. "not_found" or "out_of_stock"
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookRequest {
    /// Unique human-facing book code
    pub code: String,
    pub title: String,
    pub author: String,
    /// Number of copies on the shelf, must not be negative
    pub stock: i64,
}

/// Partial update: omitted fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookListRequest {
    /// Only return books with at least this many copies in stock
    #[serde(default)]
    pub min_stock: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub code: String,
    pub title: String,
    pub author: String,
    pub stock: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    /// Unique human-facing member code
    pub code: String,
    pub name: String,
}

/// Partial update: omitted fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub code: String,
    pub name: String,
    pub borrowed_books_count: u32,
    pub is_penalized: bool,
    /// RFC 3339 instant at which the current penalty lapses
    #[serde(default)]
    pub penalty_expires_at: Option<String>,
}

/// Response payload for create endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedCode {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowBookRequest {
    pub member_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnBookRequest {
    pub member_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowedBook {
    pub book_code: String,
    pub member_code: String,
    /// RFC 3339 instant the loan was opened
    pub borrowed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnedBook {
    pub book_code: String,
    pub member_code: String,
    /// Whole days between borrowing and returning
    pub days_borrowed: i64,
    /// True when the return triggered a penalty
    pub late: bool,
    /// RFC 3339 instant the penalty lapses, if one was applied
    #[serde(default)]
    pub penalty_expires_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_uses_status_code_key() {
        let response = ApiResponse::with_data(201, "Book created", CreatedCode { code: "ABC".to_string() });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["data"]["code"], "ABC");
        assert_eq!(json["message"], "Book created");
    }

    #[test]
    fn test_empty_envelope_omits_data() {
        let response: ApiResponse<()> = ApiResponse::empty(200, "Book updated");
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_partial_update_accepts_missing_fields() {
        let request: UpdateBookRequest = serde_json::from_str(r#"{"title":"Dune"}"#).unwrap();

        assert_eq!(request.title.as_deref(), Some("Dune"));
        assert!(request.code.is_none());
        assert!(request.stock.is_none());
    }
}
