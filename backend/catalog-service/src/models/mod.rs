/// Data models for catalog-service
///
/// - `Book`: the ranked catalog entry, owner of zero or more reviews
/// - `Review`: a rating attached to exactly one book
/// - `RankedBook`: a book row annotated with the query-derived aggregate
///   columns (`reviews_count`, `reviews_avg_rating`)
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review belonging to one book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    /// Star rating, 1..=5
    pub rating: i32,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A book annotated with per-query aggregate columns.
///
/// `reviews_count` reads 0 for books with no qualifying reviews (and also
/// when the executed plan requested no count column). `reviews_avg_rating`
/// is `None` for books with no qualifying reviews; a zero-review book is
/// never reported as "rated 0.0".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct RankedBook {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviews_count: i64,
    pub reviews_avg_rating: Option<f64>,
}
