//! Persisted entities. Wire format is camelCase JSON, stored as-is in redb.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account. The stored email is already normalized
/// (trimmed, lowercased); the password is a bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// One user's grade for one book. At most one per (book, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user_id: String,
    /// Integer in [1,5].
    pub grade: u8,
}

/// Catalogued book with its denormalized rating aggregate.
///
/// `average_rating` is derived from `ratings` and recomputed on every
/// mutation; it is never accepted from clients (the create/update payloads
/// simply have no such field). `id` and `owner_id` are immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: i32,
    /// Absolute URL of the normalized cover, served under /images.
    pub image_url: String,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    /// round(mean(grades), 1) for non-empty ratings, 0 when empty.
    #[serde(default)]
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
