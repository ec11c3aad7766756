//! Book caching and invalidation.
//!
//! The engine only depends on the [`EntityCache`] capability: a key-value
//! store with idempotent eviction. `RedisCache` is the production
//! implementation; `MemoryCache` backs tests and embedded use.

pub mod book_cache;
pub mod invalidator;
pub mod memory;
pub mod redis_cache;

use async_trait::async_trait;

use crate::error::Result;

/// Key-value cache capability.
///
/// `evict` is idempotent: removing an absent key is a no-op, not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> Result<()>;
    async fn evict(&self, key: &str) -> Result<()>;
}

pub use book_cache::BookCache;
pub use invalidator::CacheInvalidator;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
