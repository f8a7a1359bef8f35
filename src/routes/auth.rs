//! Account signup and login.
//!
//! Login failures are always reported as a generic "invalid credentials":
//! whether the email was unknown or the password wrong is never leaked.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::auth;
use crate::error::{ApiError, ApiResult};
use crate::state::ServerState;
use crate::store::StoreError;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn require_credentials(body: &Credentials) -> ApiResult<(String, String)> {
    match (&body.email, &body.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            Ok((email.clone(), password.clone()))
        }
        _ => Err(ApiError::BadRequest(
            "email and password are required".to_string(),
        )),
    }
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Credentials>,
) -> ApiResult<impl IntoResponse> {
    let (email, password) = require_credentials(&body)?;
    let email = auth::normalize_email(&email);

    let hash = tokio::task::spawn_blocking(move || auth::hash_password(&password)).await??;

    let store = state.store.clone();
    let user = tokio::task::spawn_blocking(move || store.create_user(&email, &hash))
        .await?
        .map_err(|err| match err {
            StoreError::Duplicate(_) => ApiError::EmailTaken,
            other => ApiError::from(other),
        })?;

    tracing::info!(user_id = %user.id, "account created");
    Ok((StatusCode::CREATED, Json(json!({ "message": "user created" }))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Credentials>,
) -> ApiResult<impl IntoResponse> {
    let (email, password) = require_credentials(&body)?;
    let email = auth::normalize_email(&email);

    let store = state.store.clone();
    let user = tokio::task::spawn_blocking(move || store.find_user_by_email(&email))
        .await??
        .ok_or_else(|| ApiError::Unauthenticated("invalid credentials".to_string()))?;

    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash)).await?;
    if !valid {
        return Err(ApiError::Unauthenticated("invalid credentials".to_string()));
    }

    let secret = state
        .config
        .jwt_secret
        .as_deref()
        .ok_or_else(|| ApiError::Config("JWT secret is not configured".to_string()))?;
    let token = auth::issue_token(&user.id, secret, state.config.token_ttl_hours)?;

    Ok(Json(json!({ "userId": user.id, "token": token })))
}
