use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these —
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "NOT_FOUND", "message": "..."}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const ALREADY_IN_WORKSHOP: &str = "ALREADY_IN_WORKSHOP";
    pub const INVALID_STATE: &str = "INVALID_STATE";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"code": "NOT_FOUND", "message": "catalog entry 'SN-100' not found"}
/// ```
///
/// Every variant is a caller-correctable input or state conflict. Multi-record
/// mutations are transactional, so a returned error never implies
/// partially-applied state.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Serial, entry, or record id does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate serial / duplicate reference record. HTTP 409.
    #[error("{0}")]
    AlreadyExists(String),

    /// The serial already has an open workshop entry. HTTP 409.
    #[error("{0}")]
    AlreadyInWorkshop(String),

    /// Operation attempted against an entry not in the required status,
    /// including partial-batch delivery attempts. HTTP 409.
    #[error("{0}")]
    InvalidState(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid authentication credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::AlreadyExists(_) => error_code::ALREADY_EXISTS,
            ServiceError::AlreadyInWorkshop(_) => error_code::ALREADY_IN_WORKSHOP,
            ServiceError::InvalidState(_) => error_code::INVALID_STATE,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::AlreadyExists(_) => StatusCode::CONFLICT,
            ServiceError::AlreadyInWorkshop(_) => StatusCode::CONFLICT,
            ServiceError::InvalidState(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
