use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Uploaded bytes could not be decoded/resized/encoded. Untrusted
    /// client content, so this is a 400 and never a server fault.
    #[error("unreadable or unsupported image: {0}")]
    InvalidImage(String),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("payload too large: max {0}MB allowed")]
    PayloadTooLarge(usize),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("forbidden: you do not own this resource")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("you have already rated this book")]
    AlreadyRated,

    #[error("email already in use")]
    EmailTaken,

    #[error("rate limit exceeded")]
    RateLimitExceeded,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidImage(_) | ApiError::InvalidUpload(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound | ApiError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::AlreadyRated | ApiError::EmailTaken | ApiError::Store(StoreError::Duplicate(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Store(_) | ApiError::Config(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidImage(_) => "INVALID_IMAGE",
            ApiError::InvalidUpload(_) => "INVALID_UPLOAD",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::AlreadyRated => "ALREADY_RATED",
            ApiError::EmailTaken => "EMAIL_TAKEN",
            ApiError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ApiError::Store(StoreError::NotFound) => "NOT_FOUND",
            ApiError::Store(StoreError::Duplicate(_)) => "CONFLICT",
            ApiError::Store(_) => "STORE_ERROR",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message exposed to clients. 5xx details stay in the logs.
    fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.public_message(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(format!("IO error: {err}"))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("blocking task failed: {err}"))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}
