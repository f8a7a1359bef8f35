//! API route handlers
//!
//! - `health`: liveness and readiness probes
//! - `auth`: account signup and login
//! - `books`: book CRUD, cover replacement, ratings, best-rated listing

pub mod auth;
pub mod books;
pub mod health;

use crate::error::{ApiError, ApiResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /, no authentication).
pub async fn api_info() -> ApiResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Grimoire Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/auth/signup",
            "/api/auth/login",
            "/api/books",
            "/api/books/bestrating",
            "/api/books/{id}",
            "/api/books/{id}/rating",
            "/images/{file}",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler for undefined routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
