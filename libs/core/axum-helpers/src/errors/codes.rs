//! Type-safe error codes for API responses.
//!
//! Each error code carries:
//! - String representation for client consumption (e.g., "VALIDATION_ERROR")
//! - Integer code for logging and monitoring (e.g., 1001)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::Serialize;
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid UUID format in path parameter
    InvalidUuid,

    /// JSON body could not be extracted (syntax, missing or mistyped field)
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// Query string could not be deserialized
    InvalidQuery,

    /// Malformed request not covered by a more specific code
    BadRequest,

    // Server errors
    /// An unexpected internal server error occurred
    InternalError,

    /// A dependency is not reachable
    ServiceUnavailable,

    // Storage errors (2000-2999)
    /// The storage engine rejected a write
    InsertionFailed,

    /// Any other storage failure
    DatabaseError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier clients can match on.
    ///
    /// ```rust
    /// use axum_helpers::errors::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
    /// assert_eq!(ErrorCode::InsertionFailed.as_str(), "INSERTION_FAILED");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::BadRequest => "BAD_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::InsertionFailed => "INSERTION_FAILED",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Integer code used in logs and dashboards.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::InvalidQuery => 1006,
            Self::BadRequest => 1007,
            Self::ServiceUnavailable => 1010,
            Self::InsertionFailed => 2001,
            Self::DatabaseError => 2002,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to extract JSON from request body",
            Self::NotFound => "Requested resource was not found",
            Self::InvalidQuery => "Invalid query string",
            Self::BadRequest => "Bad request",
            Self::InternalError => "An unexpected error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::InsertionFailed => "Write failed",
            Self::DatabaseError => "A database error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
