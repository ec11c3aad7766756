//! Book repository.
//!
//! Update and delete fire the corresponding lifecycle event after the row
//! mutation completes and before the call returns, so subscribers (cache
//! invalidation) observe the write synchronously.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{CatalogError, Result};
use crate::events::BookEvents;
use crate::models::Book;

const BOOK_COLUMNS: &str = "id, title, author, created_at, updated_at";

#[derive(Clone)]
pub struct BookRepo {
    pool: PgPool,
    events: Arc<BookEvents>,
}

impl BookRepo {
    pub fn new(pool: PgPool, events: Arc<BookEvents>) -> Self {
        Self { pool, events }
    }

    /// Create a new book
    pub async fn create(&self, title: &str, author: &str) -> Result<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author)
            VALUES ($1, $2)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(title)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    /// Find a book by ID
    pub async fn find_by_id(&self, book_id: Uuid) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books
            WHERE id = $1
            "#
        ))
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// List books in descending order by creation date
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books
            ORDER BY created_at DESC, id ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Update a book's scalar attributes. Fires the updated lifecycle event
    /// once the row change is durable.
    pub async fn update(&self, book_id: Uuid, title: &str, author: &str) -> Result<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $1, author = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(title)
        .bind(author)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CatalogError::BookNotFound(book_id))?;

        self.events.emit_updated(&book).await;

        Ok(book)
    }

    /// Delete a book (reviews cascade). Fires the deleted lifecycle event.
    pub async fn delete(&self, book_id: Uuid) -> Result<()> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            DELETE FROM books
            WHERE id = $1
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CatalogError::BookNotFound(book_id))?;

        self.events.emit_deleted(&book).await;

        Ok(())
    }
}
