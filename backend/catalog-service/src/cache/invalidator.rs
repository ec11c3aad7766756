//! Cache invalidation on book lifecycle events.

use async_trait::async_trait;
use tracing::warn;

use super::BookCache;
use crate::error::Result;
use crate::events::BookEventHandler;
use crate::models::Book;

/// Evicts the cached representation of a book when the book is updated or
/// deleted. Eviction failures are logged and never propagated: a cache
/// fault must not fail or roll back the mutation that triggered it.
pub struct CacheInvalidator {
    cache: BookCache,
}

impl CacheInvalidator {
    pub fn new(cache: BookCache) -> Self {
        Self { cache }
    }

    async fn evict(&self, book: &Book, event: &str) {
        if let Err(e) = self.cache.evict_book(book.id).await {
            warn!(
                book_id = %book.id,
                "cache eviction after {} failed: {}", event, e
            );
        }
    }
}

#[async_trait]
impl BookEventHandler for CacheInvalidator {
    async fn book_updated(&self, book: &Book) -> Result<()> {
        self.evict(book, "update").await;
        Ok(())
    }

    async fn book_deleted(&self, book: &Book) -> Result<()> {
        self.evict(book, "delete").await;
        Ok(())
    }
}
