//! Typed cache for book detail representations.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::EntityCache;
use crate::error::Result;
use crate::models::Book;

/// Book cache keyed by `book:{id}`, serde_json payloads, no TTL. The only
/// lifecycle event is eviction on update/delete.
#[derive(Clone)]
pub struct BookCache {
    store: Arc<dyn EntityCache>,
}

impl BookCache {
    pub fn new(store: Arc<dyn EntityCache>) -> Self {
        Self { store }
    }

    fn book_key(book_id: Uuid) -> String {
        format!("book:{}", book_id)
    }

    pub async fn read_book(&self, book_id: Uuid) -> Result<Option<Book>> {
        let key = Self::book_key(book_id);
        match self.store.get(&key).await? {
            Some(payload) => {
                let book = serde_json::from_str::<Book>(&payload)?;
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    pub async fn write_book(&self, book: &Book) -> Result<()> {
        let key = Self::book_key(book.id);
        let payload = serde_json::to_string(book)?;
        self.store.put(&key, &payload).await?;
        Ok(())
    }

    pub async fn evict_book(&self, book_id: Uuid) -> Result<()> {
        let key = Self::book_key(book_id);
        self.store.evict(&key).await?;
        debug!("evicted cached book {}", book_id);
        Ok(())
    }
}
