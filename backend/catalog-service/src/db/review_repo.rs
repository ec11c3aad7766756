//! Review repository.

use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::error::{CatalogError, Result};
use crate::models::Review;

#[derive(Clone)]
pub struct ReviewRepo {
    pool: PgPool,
}

impl ReviewRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a review for a book. Ratings are 1..=5; anything else is
    /// rejected before touching the database.
    pub async fn create(&self, book_id: Uuid, rating: i32, body: Option<&str>) -> Result<Review> {
        if !(1..=5).contains(&rating) {
            return Err(CatalogError::InvalidRating(rating));
        }

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (book_id, rating, body)
            VALUES ($1, $2, $3)
            RETURNING id, book_id, rating, body, created_at
            "#,
        )
        .bind(book_id)
        .bind(rating)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    /// List reviews for a book, newest first
    pub async fn list_for_book(
        &self,
        book_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, book_id, rating, body, created_at
            FROM reviews
            WHERE book_id = $1
            ORDER BY created_at DESC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(book_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Count all reviews for a book
    pub async fn count_for_book(&self, book_id: Uuid) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM reviews WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count"))
    }
}
