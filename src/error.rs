//! Error types for the portfolio backend
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// Every variant maps to one HTTP status code. The response body is
/// always `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// No bearer token was supplied (401)
    #[error("Authentication required")]
    Unauthenticated,

    /// Login credentials did not match (401)
    #[error("Invalid username or password")]
    Unauthorized,

    /// Token present but invalid or expired (403)
    #[error("Invalid or expired token")]
    Forbidden,

    /// Missing required field or malformed payload (400)
    #[error("{0}")]
    InvalidInput(String),

    /// Row does not exist (404)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Upload rejected or backend write failed (400)
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Uploaded file exceeds the per-file limit (400)
    #[error("File exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    /// Persistence backend is not configured (500)
    #[error("Storage backend is not configured")]
    StorageUnavailable,

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "unauthenticated",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden => "forbidden",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::UploadFailed(_) => "upload_failed",
            AppError::PayloadTooLarge { .. } => "payload_too_large",
            AppError::StorageUnavailable => "storage_unavailable",
            AppError::Database(_) => "database",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_)
            | AppError::UploadFailed(_)
            | AppError::PayloadTooLarge { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StorageUnavailable
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Server-side failures are logged in full; the client only gets a
    /// short message.
    fn into_response(self) -> Response {
        use axum::Json;

        let status = self.status();
        let error_message = match &self {
            AppError::Database(error) => {
                tracing::error!(%error, "Database error");
                "Database error".to_string()
            }
            AppError::Internal(error) => {
                tracing::error!(error = ?error, "Internal error");
                "Internal server error".to_string()
            }
            AppError::Config(message) => {
                tracing::error!(%message, "Configuration error");
                "Server misconfigured".to_string()
            }
            _ => self.to_string(),
        };

        crate::metrics::ERRORS_TOTAL
            .with_label_values(&[self.kind()])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_distinguish_missing_from_invalid() {
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn upload_errors_are_client_errors() {
        assert_eq!(
            AppError::PayloadTooLarge { limit: 5 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UploadFailed("unsupported file type".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(AppError::NotFound("Work").to_string(), "Work not found");
    }

    #[test]
    fn storage_unavailable_is_server_error() {
        assert_eq!(
            AppError::StorageUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
