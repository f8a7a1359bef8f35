//! Grimoire - REST backend for a community book catalogue
//!
//! This crate provides an HTTP server for a book-cataloguing application:
//!
//! - **Accounts**: signup/login with bcrypt password hashing and HS256
//!   session tokens
//! - **Books**: CRUD with strict owner-only mutation
//! - **Covers**: uploaded images are normalized (EXIF-aware rotation,
//!   bounded to 1200px, WebP re-encode) and reclaimed when superseded or
//!   their book is deleted
//! - **Ratings**: one grade per user per book, with a cached average
//!   recomputed on every mutation, and a best-rated listing
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use grimoire::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     grimoire::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `POST /api/auth/signup` - Create an account
//! - `POST /api/auth/login` - Obtain a session token
//! - `GET /api/books` - List books
//! - `GET /api/books/bestrating` - Top-rated books
//! - `GET /api/books/{id}` - Get one book
//! - `GET /images/{file}` - Normalized cover images (static)
//!
//! ## Protected (bearer token required)
//!
//! - `POST /api/books` - Create a book (multipart: `book` JSON + `image`)
//! - `PUT /api/books/{id}` - Update a book (multipart to replace the cover,
//!   JSON for text-only updates)
//! - `DELETE /api/books/{id}` - Delete a book and reclaim its cover
//! - `POST /api/books/{id}/rating` - Rate a book (once per user)

pub mod auth;
pub mod config;
pub mod error;
pub mod images;
pub mod middleware;
pub mod models;
pub mod rating;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod upload;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
