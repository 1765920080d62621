//! Web-specific error types and conversions
//!
//! Errors render as a JSON envelope `{"error": {"code", "message"[, "details"]}}`
//! with the matching HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use loadgen_core::WorkloadError;
use serde_json::json;
use thiserror::Error;

/// Web-specific error type for HTTP API operations
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Validation error: {errors:?}")]
    Validation { errors: Vec<ValidationError> },
}

/// Validation error details
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidationError {
    pub field: Option<String>,
    pub message: String,
    pub code: String,
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest { .. } | WebError::Validation { .. } => StatusCode::BAD_REQUEST,
            WebError::NotFound { .. } => StatusCode::NOT_FOUND,
            WebError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            WebError::BadRequest { .. } => "BAD_REQUEST",
            WebError::NotFound { .. } => "NOT_FOUND",
            WebError::Internal { .. } => "INTERNAL_ERROR",
            WebError::Validation { .. } => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }

        let body = match &self {
            WebError::Validation { errors } => json!({
                "error": {
                    "code": self.error_code(),
                    "message": "Request validation failed",
                    "details": errors
                }
            }),
            _ => json!({
                "error": {
                    "code": self.error_code(),
                    "message": self.to_string()
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<WorkloadError> for WebError {
    fn from(error: WorkloadError) -> Self {
        match error {
            WorkloadError::Analysis(inner) => WebError::validation_single(
                None,
                inner.to_string(),
                "OUT_OF_RANGE".to_string(),
            ),
            WorkloadError::Kernel(inner) => WebError::internal(inner.to_string()),
        }
    }
}

// Common error constructors
impl WebError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        WebError::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        WebError::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        WebError::Internal {
            message: message.into(),
        }
    }

    pub fn validation_single(field: Option<String>, message: String, code: String) -> Self {
        WebError::Validation {
            errors: vec![ValidationError { field, message, code }],
        }
    }
}
