//! Book CRUD, cover replacement, ratings and the best-rated listing.
//!
//! Create and image-replacing updates arrive as multipart forms (`book`
//! JSON part + `image` file part); text-only updates arrive as bare JSON.
//! Protected fields (`id`, `ownerId`, `ratings`, `averageRating`,
//! `imageUrl`) do not exist on the payload types, so direct writes to the
//! derived aggregate are structurally impossible.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{Book, Rating};
use crate::rating::{self, BEST_RATED_LIMIT, MAX_GRADE, MIN_GRADE};
use crate::state::ServerState;
use crate::store::StoreError;
use crate::images;
use crate::upload::{self, UploadedFile};

/// Text fields of a new book, parsed from the multipart `book` JSON part.
#[derive(Debug, Default, Deserialize)]
struct RawBookFields {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    year: Option<i32>,
}

#[derive(Debug)]
struct BookFields {
    title: String,
    author: String,
    genre: String,
    year: i32,
}

impl BookFields {
    /// Validate the create payload, reporting every missing/invalid field
    /// at once rather than the first.
    fn parse(book_json: Option<&str>) -> ApiResult<Self> {
        let json = book_json.ok_or_else(|| {
            ApiError::BadRequest("missing 'book' field in form data".to_string())
        })?;
        let raw: RawBookFields = serde_json::from_str(json).map_err(|e| {
            ApiError::BadRequest(format!("'book' field is not valid JSON: {e}"))
        })?;

        let mut missing = Vec::new();
        let title = non_empty(&raw.title).unwrap_or_else(|| {
            missing.push("title");
            String::new()
        });
        let author = non_empty(&raw.author).unwrap_or_else(|| {
            missing.push("author");
            String::new()
        });
        let genre = non_empty(&raw.genre).unwrap_or_else(|| {
            missing.push("genre");
            String::new()
        });
        let year = raw.year.unwrap_or_else(|| {
            missing.push("year");
            0
        });

        if !missing.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "missing or invalid fields: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            title,
            author,
            genre,
            year,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Partial text update. Unknown fields in the payload are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookUpdate {
    title: Option<String>,
    author: Option<String>,
    genre: Option<String>,
    year: Option<i32>,
}

impl BookUpdate {
    /// Provided string fields must stay non-empty; absent fields are fine.
    fn validate(&self) -> ApiResult<()> {
        for (name, value) in [
            ("title", &self.title),
            ("author", &self.author),
            ("genre", &self.genre),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ApiError::BadRequest(format!(
                    "field '{name}' must not be empty"
                )));
            }
        }
        Ok(())
    }

    fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title.trim().to_string();
        }
        if let Some(author) = self.author {
            book.author = author.trim().to_string();
        }
        if let Some(genre) = self.genre {
            book.genre = genre.trim().to_string();
        }
        if let Some(year) = self.year {
            book.year = year;
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    /// Tolerated for client compatibility; must match the token identity.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Base URL for minting image URLs: explicit configuration wins, otherwise
/// derived from the request's Host header.
fn request_base_url(state: &ServerState, headers: &HeaderMap) -> ApiResult<String> {
    if let Some(base) = &state.config.public_base_url {
        return Ok(base.trim_end_matches('/').to_string());
    }
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing Host header".to_string()))?;
    Ok(format!("http://{host}"))
}

fn grade_from(value: Option<f64>) -> ApiResult<u8> {
    let v = value.ok_or_else(|| ApiError::BadRequest("missing 'rating' field".to_string()))?;
    let in_range = v >= f64::from(MIN_GRADE) && v <= f64::from(MAX_GRADE);
    if !v.is_finite() || v.fract() != 0.0 || !in_range {
        return Err(ApiError::BadRequest(format!(
            "rating must be an integer between {MIN_GRADE} and {MAX_GRADE}"
        )));
    }
    Ok(v as u8)
}

/// GET /api/books
pub async fn list_books(State(state): State<Arc<ServerState>>) -> ApiResult<impl IntoResponse> {
    let store = state.store.clone();
    let books = tokio::task::spawn_blocking(move || store.list_books()).await??;
    Ok(Json(books))
}

/// GET /api/books/bestrating
pub async fn best_rated(State(state): State<Arc<ServerState>>) -> ApiResult<impl IntoResponse> {
    let store = state.store.clone();
    let books = tokio::task::spawn_blocking(move || store.list_books()).await??;
    Ok(Json(rating::best_rated(books, BEST_RATED_LIMIT)))
}

/// GET /api/books/{id}
pub async fn get_book(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let store = state.store.clone();
    let book = tokio::task::spawn_blocking(move || store.get_book(&id))
        .await??
        .ok_or(ApiError::NotFound)?;
    Ok(Json(book))
}

/// POST /api/books — multipart form with `book` JSON and an `image` file.
pub async fn create_book(
    State(state): State<Arc<ServerState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let parts = upload::read_multipart(&mut multipart, &state.config).await?;
    let Some(file) = parts.file else {
        return Err(ApiError::BadRequest(
            "an image file is required (field 'image')".to_string(),
        ));
    };

    let result = persist_new_book(&state, &user_id, &headers, parts.book_json.as_deref(), &file).await;
    if result.is_err() {
        // No upload survives a failed create. persist_new_book reclaims the
        // normalized file on a failed store write; this covers the temp.
        images::remove_file_quiet(&file.path);
    }
    let book = result?;

    tracing::info!(book_id = %book.id, owner_id = %book.owner_id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn persist_new_book(
    state: &ServerState,
    owner_id: &str,
    headers: &HeaderMap,
    book_json: Option<&str>,
    file: &UploadedFile,
) -> ApiResult<Book> {
    // Text fields are validated before the image codec runs, so an invalid
    // payload never produces a normalized file that then has to be undone.
    let fields = BookFields::parse(book_json)?;
    let base = request_base_url(state, headers)?;

    let input = file.path.clone();
    let normalized = tokio::task::spawn_blocking(move || images::normalize(&input)).await??;
    let filename = normalized
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApiError::Internal("normalized image has no file name".to_string()))?
        .to_string();

    let now = Utc::now();
    let book = Book {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        title: fields.title,
        author: fields.author,
        genre: fields.genre,
        year: fields.year,
        image_url: images::public_url(&base, &filename),
        ratings: Vec::new(),
        average_rating: 0.0,
        created_at: now,
        updated_at: now,
    };

    let store = state.store.clone();
    let stored = book.clone();
    if let Err(err) = tokio::task::spawn_blocking(move || store.insert_book(&stored)).await? {
        images::remove_file_quiet(&normalized);
        return Err(err.into());
    }

    Ok(book)
}

/// PUT /api/books/{id} — multipart when replacing the cover, bare JSON for
/// text-only updates. Owner-only, unconditionally.
pub async fn update_book(
    State(state): State<Arc<ServerState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<impl IntoResponse> {
    let headers = request.headers().clone();

    // Ownership is checked against the pre-update record, which is also
    // the record whose cover may need reclaiming afterwards.
    let store = state.store.clone();
    let lookup_id = id.clone();
    let existing = tokio::task::spawn_blocking(move || store.get_book(&lookup_id))
        .await??
        .ok_or(ApiError::NotFound)?;
    if existing.owner_id != user_id {
        return Err(ApiError::Forbidden);
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let updated = if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::InvalidUpload(format!("malformed multipart body: {e}")))?;
        let parts = upload::read_multipart(&mut multipart, &state.config).await?;
        let Some(file) = parts.file else {
            return Err(ApiError::BadRequest(
                "multipart update requires a new image (field 'image'); \
                 send JSON to update text fields only"
                    .to_string(),
            ));
        };

        let result =
            replace_book_image(&state, &existing, &headers, parts.book_json.as_deref(), &file)
                .await;
        if result.is_err() {
            images::remove_file_quiet(&file.path);
        }
        result?
    } else {
        let Json(update) = Json::<BookUpdate>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON payload: {e}")))?;
        update.validate()?;

        let store = state.store.clone();
        let update_id = id.clone();
        tokio::task::spawn_blocking(move || {
            store.update_book(&update_id, |book| update.apply(book))
        })
        .await??
    };

    Ok(Json(updated))
}

async fn replace_book_image(
    state: &ServerState,
    existing: &Book,
    headers: &HeaderMap,
    book_json: Option<&str>,
    file: &UploadedFile,
) -> ApiResult<Book> {
    // Text fields may ride along with the new cover.
    let update = match book_json {
        Some(json) => serde_json::from_str::<BookUpdate>(json).map_err(|e| {
            ApiError::BadRequest(format!("'book' field is not valid JSON: {e}"))
        })?,
        None => BookUpdate::default(),
    };
    update.validate()?;
    let base = request_base_url(state, headers)?;

    let input = file.path.clone();
    let normalized = tokio::task::spawn_blocking(move || images::normalize(&input)).await??;
    let filename = normalized
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ApiError::Internal("normalized image has no file name".to_string()))?
        .to_string();
    let new_url = images::public_url(&base, &filename);

    let store = state.store.clone();
    let book_id = existing.id.clone();
    let url = new_url.clone();
    let result = tokio::task::spawn_blocking(move || {
        store.update_book(&book_id, move |book| {
            update.apply(book);
            book.image_url = url;
        })
    })
    .await?;

    match result {
        Ok(book) => {
            // The old cover goes only after the new reference has been
            // durably committed; a crash in between leaves both files but
            // never a record pointing at nothing.
            images::remove_by_url(&state.config.image_dir, &existing.image_url);
            Ok(book)
        }
        Err(err) => {
            images::remove_file_quiet(&normalized);
            Err(err.into())
        }
    }
}

/// DELETE /api/books/{id} — owner-only. The record delete is the
/// authoritative outcome; cover removal afterwards is best-effort.
pub async fn delete_book(
    State(state): State<Arc<ServerState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let store = state.store.clone();
    let lookup_id = id.clone();
    let existing = tokio::task::spawn_blocking(move || store.get_book(&lookup_id))
        .await??
        .ok_or(ApiError::NotFound)?;
    if existing.owner_id != user_id {
        return Err(ApiError::Forbidden);
    }

    let store = state.store.clone();
    let removed = tokio::task::spawn_blocking(move || store.delete_book(&id))
        .await??
        .ok_or(ApiError::NotFound)?;

    images::remove_by_url(&state.config.image_dir, &removed.image_url);

    tracing::info!(book_id = %removed.id, "book deleted");
    Ok(Json(json!({ "message": "book deleted" })))
}

/// POST /api/books/{id}/rating — one grade per user per book, final.
pub async fn rate_book(
    State(state): State<Arc<ServerState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<RateRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(body_user) = &body.user_id {
        if body_user != &user_id {
            return Err(ApiError::BadRequest(
                "userId in body does not match the authenticated user".to_string(),
            ));
        }
    }
    let grade = grade_from(body.rating)?;

    let store = state.store.clone();
    let rating = Rating {
        user_id: user_id.clone(),
        grade,
    };
    let result = tokio::task::spawn_blocking(move || store.add_rating(&id, rating)).await?;

    match result {
        Ok(book) => Ok(Json(book)),
        Err(StoreError::NotFound) => Err(ApiError::NotFound),
        Err(StoreError::Duplicate(_)) => Err(ApiError::AlreadyRated),
        Err(other) => Err(other.into()),
    }
}
