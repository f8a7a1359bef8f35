//! Authentication: bcrypt password hashing, HS256 session tokens, and the
//! bearer-token middleware guarding mutation routes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::ServerState;

/// Token claims: the authenticated user id and an expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Authenticated caller identity, inserted into request extensions by
/// [`require_auth`] and trusted by handlers as the acting user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Account identity normalization, applied at signup AND login so
/// `" Foo@Bar.com "` and `"foo@bar.com"` name the same account.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// bcrypt is deliberately slow; callers run this on the blocking pool.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn issue_token(user_id: &str, secret: &str, ttl_hours: i64) -> Result<String, ApiError> {
    let exp = (Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// Verify a token and return the user id it names. An expired token reads
/// differently from an invalid one; both are 401.
pub fn verify_token(token: &str, secret: &str) -> Result<String, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            ApiError::Unauthenticated("token expired".to_string())
        }
        _ => ApiError::Unauthenticated("invalid token".to_string()),
    })?;
    Ok(data.claims.sub)
}

/// Extract the token from `Authorization: Bearer <token>`, tolerating
/// scheme case and surrounding whitespace.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Bearer token authentication middleware
pub async fn require_auth(
    State(state): State<Arc<ServerState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or_else(|| {
        ApiError::Unauthenticated(
            "authentication required: provide 'Authorization: Bearer <token>'".to_string(),
        )
    })?;

    // Startup validation guarantees the secret; this is the fail-fast
    // signal if a build ever skips it.
    let secret = state
        .config
        .jwt_secret
        .clone()
        .ok_or_else(|| ApiError::Config("JWT secret is not configured".to_string()))?;

    let user_id = verify_token(&token, &secret)?;

    if !state.check_rate_limit(&user_id) {
        return Err(ApiError::RateLimitExceeded);
    }

    request.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(request).await)
}
