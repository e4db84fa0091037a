use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// A handler error: either a fail (4xx, caller's fault) or an error (5xx).
///
/// Both render as a plain-text body carrying the message, including the
/// underlying error text for 5xx responses.
#[derive(Debug)]
pub enum ApiError {
    Fail(StatusCode, String),
    Error(StatusCode, String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Fail(code, msg) => (code, msg),
            ApiError::Error(code, msg) => {
                tracing::debug!(status = %code, error = %msg, "Request failed");
                (code, msg)
            }
        };
        (status, message).into_response()
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::NOT_FOUND, message.into())
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::METHOD_NOT_ALLOWED, message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::PAYLOAD_TOO_LARGE, message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Error(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Fail(code, _) | ApiError::Error(code, _) => *code,
        }
    }
}
