//! Rating aggregate engine.
//!
//! The average is a cached statistic: it is always recomputed from the full
//! ratings list, never adjusted incrementally, so concurrent partial updates
//! cannot make it drift from its source of truth.

use std::cmp::Ordering;

use crate::models::{Book, Rating};

/// Grades are integers in [1,5]. A grade of 0 is rejected at the entry
/// point; 0 only ever appears as the average of an unrated book.
pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 5;

/// How many books the best-rated listing returns.
pub const BEST_RATED_LIMIT: usize = 3;

/// Mean grade rounded to one decimal place (half away from zero).
/// An empty list yields 0, not NaN and not an absent value.
pub fn compute_average(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: f64 = ratings.iter().map(|r| f64::from(r.grade)).sum();
    let mean = sum / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Top `limit` books by average rating, descending, ties broken by most
/// recent creation first. Books that were never rated (average 0) are
/// excluded deliberately: an unrated book is not a badly rated one.
pub fn best_rated(mut books: Vec<Book>, limit: usize) -> Vec<Book> {
    books.retain(|b| b.average_rating > 0.0);
    books.sort_by(|a, b| {
        b.average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    books.truncate(limit);
    books
}
