//! Maps service errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use furnish_auth::AuthError;
use furnish_catalog::{CatalogError, ErrorKind};

/// An error ready to leave the API boundary.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Internal failures get a generic body; the detail goes to the log.
    fn internal(err: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::FileTooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
            }
            _ => match err.kind() {
                ErrorKind::Validation => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
                ErrorKind::NotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
                ErrorKind::Conflict => Self::new(StatusCode::CONFLICT, err.to_string()),
                ErrorKind::Dependency => Self::internal(&err),
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::EmailTaken => Self::new(StatusCode::CONFLICT, err.to_string()),
            AuthError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            AuthError::InvalidField { .. } => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            AuthError::UserNotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            AuthError::Token { .. } => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            AuthError::Hashing { .. } | AuthError::Repository(_) => Self::internal(&err),
        }
    }
}
