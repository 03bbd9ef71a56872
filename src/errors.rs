//! One error type for the HTTP layer, the CLI commands and the bot.
//!
//! Client-side variants carry the text shown next to the form that failed.
//! Server-side variants log their detail and answer with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Session gate
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Email is not registered")]
    UnknownEmail,

    #[error("Incorrect password")]
    WrongPassword,

    // Rows and form input
    #[error("Not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    // Storage and outbound integrations
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Notification failed: {0}")]
    Notify(String),

    #[error("{0}")]
    Credentials(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(String),
}

/// `{"error": {"code", "message"}}`
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl AppError {
    /// HTTP status and machine-readable code.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::UnknownEmail => (StatusCode::UNAUTHORIZED, "UNKNOWN_EMAIL"),
            AppError::WrongPassword => (StatusCode::UNAUTHORIZED, "WRONG_PASSWORD"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::Upload(_) => (StatusCode::BAD_GATEWAY, "UPLOAD_ERROR"),
            AppError::Notify(_) => (StatusCode::BAD_GATEWAY, "NOTIFY_ERROR"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Credentials(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CREDENTIALS_ERROR"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.classify().0
    }

    /// Text for the client. Server-side detail goes to the log instead.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!(error = ?e, "database error");
                "A database error occurred".to_string()
            }
            AppError::Upload(detail) => {
                tracing::error!(detail = %detail, "drive upload failed");
                "Document upload failed".to_string()
            }
            AppError::Notify(detail) => {
                tracing::error!(detail = %detail, "chat notification failed");
                "Notification could not be delivered".to_string()
            }
            AppError::Credentials(detail) | AppError::Config(detail) | AppError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                "An internal error occurred".to_string()
            }
            client_side => client_side.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code,
                message: self.public_message(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// `Option` lookups that should answer 404 when empty.
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        AppError::Upload(msg.into())
    }

    pub fn notify(msg: impl Into<String>) -> Self {
        AppError::Notify(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn test_login_errors_are_unauthorized_with_inline_text() {
        assert_eq!(AppError::UnknownEmail.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::WrongPassword.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::UnknownEmail.public_message(), "Email is not registered");
        assert_eq!(AppError::WrongPassword.public_message(), "Incorrect password");
    }

    #[test]
    fn test_oversized_upload_is_413_with_its_message() {
        let err = AppError::PayloadTooLarge("File exceeds 25 MiB".to_string());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.public_message(), "File exceeds 25 MiB");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::internal("stack trace with secrets");
        assert_eq!(err.public_message(), "An internal error occurred");

        let err = AppError::upload("drive said 403");
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.public_message(), "Document upload failed");
    }

    #[tokio::test]
    async fn test_response_envelope() {
        let response = AppError::validation("Leaver name is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Leaver name is required");
    }

    #[test]
    fn test_ok_or_not_found() {
        let missing: Option<i32> = None;
        assert!(matches!(missing.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
    }
}
