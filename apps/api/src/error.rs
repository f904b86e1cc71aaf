//! # API Error Type
//!
//! Unified error type for route handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stocky                                 │
//! │                                                                         │
//! │  handler -> ApiResult<Json<T>>                                          │
//! │         │                                                               │
//! │         ├── ValidationError ──┐                                         │
//! │         ├── CoreError ────────┼──► ApiError { status, code, message }   │
//! │         └── DbError ──────────┘                │                        │
//! │                                                ▼                        │
//! │                               IntoResponse: status + JSON body          │
//! │                               { "message": "...", "code": "..." }       │
//! │                                                                         │
//! │  5xx details are logged under an `error_id`, never sent to the client. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use stocky_core::{CoreError, ValidationError};
use stocky_db::DbError;

/// API error returned from route handlers.
///
/// ## Serialization
/// ```json
/// { "message": "invalid items", "code": "VALIDATION_ERROR" }
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,

    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Missing or invalid credentials (401)
    Unauthorized,

    /// Authenticated but not allowed (403)
    Forbidden,

    /// Resource not found (404)
    NotFound,

    /// Duplicate or concurrent change (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    code: ErrorCode,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationError, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::FORBIDDEN, ErrorCode::Forbidden, message)
    }

    /// `not_found("Company")` reads "Company not found".
    pub fn not_found(resource: &str) -> Self {
        ApiError::new(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            format!("{resource} not found"),
        )
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::CONFLICT, ErrorCode::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal,
            message,
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            let error_id = Uuid::new_v4();
            tracing::error!(error_id = %error_id, code = ?self.code, error = %self.message, "request failed");
            let body = ErrorBody {
                message: "Internal server error",
                code: self.code,
            };
            return (self.status, Json(body)).into_response();
        }

        let body = ErrorBody {
            message: &self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Converts database errors to API errors.
///
/// Unique violations are conflicts; route handlers replace the message with
/// the one clients expect ("email already registered", ...).
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::not_found(&entity),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{field} '{value}' already exists"))
            }
            DbError::StaleWrite { entity, .. } => {
                ApiError::conflict(format!("{entity} was changed by another request"))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(error = %message, "Foreign key violation");
                ApiError::bad_request("Invalid reference")
            }
            other => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::DatabaseError,
                other.to_string(),
            ),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Forbidden => ApiError::forbidden("Forbidden"),
            CoreError::InvalidOrderTransition { .. } => ApiError::conflict(err.to_string()),
            CoreError::InvalidItems { ref reason } => {
                tracing::debug!(reason = %reason, "Rejected order lines");
                ApiError::bad_request(err.to_string())
            }
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
