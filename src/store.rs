//! Embedded document store backed by redb.
//!
//! Documents are stored as JSON under string keys. redb gives ACID,
//! single-writer transactions: every read-check-then-write below runs
//! inside one write transaction, which is what upholds the one-rating-
//! per-user invariant and the email uniqueness constraint under
//! concurrent requests. Write transactions block, so async callers wrap
//! these methods in `tokio::task::spawn_blocking`.

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use uuid::Uuid;

use crate::models::{Book, Rating, User};
use crate::rating;

const BOOKS: TableDefinition<&str, &[u8]> = TableDefinition::new("books");
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
/// Uniqueness index: normalized email -> user id.
const USER_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("user_emails");

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated; the payload names the key
    /// ("email", "rating") so callers can map it to a precise conflict.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("record not found")]
    NotFound,

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored document is corrupt: {0}")]
    Codec(#[from] serde_json::Error),
}

fn backend<E: std::fmt::Display>(err: E) -> StoreError {
    StoreError::Backend(err.to_string())
}

pub struct Store {
    db: Database,
}

impl Store {
    /// Open or create the database file and make sure all tables exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(backend)?;

        let write_txn = db.begin_write().map_err(backend)?;
        {
            // Accessing a table creates it if it doesn't exist
            write_txn.open_table(BOOKS).map_err(backend)?;
            write_txn.open_table(USERS).map_err(backend)?;
            write_txn.open_table(USER_EMAILS).map_err(backend)?;
        }
        write_txn.commit().map_err(backend)?;

        Ok(Self { db })
    }

    /// Insert a new account. The email must already be normalized; the
    /// email index is checked and written in the same transaction, so two
    /// concurrent signups for one address cannot both succeed.
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };

        let write_txn = self.db.begin_write().map_err(backend)?;
        {
            let mut emails = write_txn.open_table(USER_EMAILS).map_err(backend)?;
            if emails.get(email).map_err(backend)?.is_some() {
                return Err(StoreError::Duplicate("email"));
            }
            emails.insert(email, user.id.as_str()).map_err(backend)?;

            let mut users = write_txn.open_table(USERS).map_err(backend)?;
            let doc = serde_json::to_vec(&user)?;
            users.insert(user.id.as_str(), doc.as_slice()).map_err(backend)?;
        }
        write_txn.commit().map_err(backend)?;

        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend)?;
        let emails = read_txn.open_table(USER_EMAILS).map_err(backend)?;

        let user_id = match emails.get(email).map_err(backend)? {
            Some(id) => id.value().to_string(),
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS).map_err(backend)?;
        match users.get(user_id.as_str()).map_err(backend)? {
            Some(doc) => Ok(Some(serde_json::from_slice(doc.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_book(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend)?;
        let books = read_txn.open_table(BOOKS).map_err(backend)?;

        match books.get(id).map_err(backend)? {
            Some(doc) => Ok(Some(serde_json::from_slice(doc.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend)?;
        let books = read_txn.open_table(BOOKS).map_err(backend)?;

        let mut out = Vec::new();
        for entry in books.iter().map_err(backend)? {
            let (_, doc) = entry.map_err(backend)?;
            out.push(serde_json::from_slice(doc.value())?);
        }
        Ok(out)
    }

    pub fn insert_book(&self, book: &Book) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(backend)?;
        {
            let mut books = write_txn.open_table(BOOKS).map_err(backend)?;
            let doc = serde_json::to_vec(book)?;
            books.insert(book.id.as_str(), doc.as_slice()).map_err(backend)?;
        }
        write_txn.commit().map_err(backend)?;
        Ok(())
    }

    /// Read-modify-write of one book inside a single transaction.
    /// `updated_at` is bumped here so callers cannot forget it.
    pub fn update_book<F>(&self, id: &str, apply: F) -> Result<Book, StoreError>
    where
        F: FnOnce(&mut Book),
    {
        let write_txn = self.db.begin_write().map_err(backend)?;
        let updated = {
            let mut books = write_txn.open_table(BOOKS).map_err(backend)?;

            let mut book: Book = {
                let guard = books.get(id).map_err(backend)?;
                match guard {
                    Some(doc) => serde_json::from_slice(doc.value())?,
                    None => return Err(StoreError::NotFound),
                }
            };

            apply(&mut book);
            book.updated_at = Utc::now();

            let doc = serde_json::to_vec(&book)?;
            books.insert(id, doc.as_slice()).map_err(backend)?;
            book
        };
        write_txn.commit().map_err(backend)?;

        Ok(updated)
    }

    /// Conditional rating append: fails with `Duplicate("rating")` when the
    /// user already appears in the list. Check, append and average recompute
    /// all happen in one write transaction, so two concurrent submissions
    /// from the same user cannot both pass the check.
    pub fn add_rating(&self, book_id: &str, rating: Rating) -> Result<Book, StoreError> {
        let write_txn = self.db.begin_write().map_err(backend)?;
        let updated = {
            let mut books = write_txn.open_table(BOOKS).map_err(backend)?;

            let mut book: Book = {
                let guard = books.get(book_id).map_err(backend)?;
                match guard {
                    Some(doc) => serde_json::from_slice(doc.value())?,
                    None => return Err(StoreError::NotFound),
                }
            };

            if book.ratings.iter().any(|r| r.user_id == rating.user_id) {
                return Err(StoreError::Duplicate("rating"));
            }

            // Submission order is preserved; the average is recomputed from
            // the full list, never adjusted in place.
            book.ratings.push(rating);
            book.average_rating = rating::compute_average(&book.ratings);
            book.updated_at = Utc::now();

            let doc = serde_json::to_vec(&book)?;
            books.insert(book_id, doc.as_slice()).map_err(backend)?;
            book
        };
        write_txn.commit().map_err(backend)?;

        Ok(updated)
    }

    /// Remove a book, returning the removed record so the caller can
    /// reclaim its cover image after the delete has committed.
    pub fn delete_book(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let write_txn = self.db.begin_write().map_err(backend)?;
        let removed = {
            let mut books = write_txn.open_table(BOOKS).map_err(backend)?;
            let removed = match books.remove(id).map_err(backend)? {
                Some(doc) => Some(serde_json::from_slice(doc.value())?),
                None => None,
            };
            removed
        };
        write_txn.commit().map_err(backend)?;

        Ok(removed)
    }
}
