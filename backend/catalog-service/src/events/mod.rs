//! Book lifecycle events.
//!
//! Explicit subscriber registry instead of framework-level model hooks:
//! handlers are registered once at the composition root
//! (`CatalogService::connect`) and fired synchronously by the repository
//! after the row mutation completes, so an event is only ever observed for
//! a write that actually happened. A failing handler is logged and never
//! fails the mutation that triggered it.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::models::Book;

/// Receiver for book lifecycle events.
#[async_trait]
pub trait BookEventHandler: Send + Sync {
    async fn book_updated(&self, book: &Book) -> Result<()>;
    async fn book_deleted(&self, book: &Book) -> Result<()>;
}

/// Subscriber registry for book lifecycle events.
#[derive(Default)]
pub struct BookEvents {
    handlers: RwLock<Vec<Arc<dyn BookEventHandler>>>,
}

impl BookEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Intended to be called from the composition root
    /// before any mutation runs.
    pub fn subscribe(&self, handler: Arc<dyn BookEventHandler>) {
        let mut guard = self.handlers.write().unwrap_or_else(|p| p.into_inner());
        guard.push(handler);
    }

    pub async fn emit_updated(&self, book: &Book) {
        for handler in self.snapshot() {
            if let Err(e) = handler.book_updated(book).await {
                warn!(book_id = %book.id, "book-updated handler failed: {}", e);
            }
        }
    }

    pub async fn emit_deleted(&self, book: &Book) {
        for handler in self.snapshot() {
            if let Err(e) = handler.book_deleted(book).await {
                warn!(book_id = %book.id, "book-deleted handler failed: {}", e);
            }
        }
    }

    // Clone the handler list up front: the lock is never held across await.
    fn snapshot(&self) -> Vec<Arc<dyn BookEventHandler>> {
        let guard = self.handlers.read().unwrap_or_else(|p| p.into_inner());
        guard.clone()
    }
}
