/// Catalog Service Library
///
/// Ranks books by engagement signals derived from their reviews, within
/// optional time windows, and keeps the per-book cache consistent with
/// book mutations.
///
/// # Modules
///
/// - `models`: Data structures for books, reviews, ranked rows
/// - `db`: Database access layer, repositories, and the ranking query plan
/// - `services`: Ranking presets and the injected time source
/// - `cache`: Book caching and lifecycle-driven invalidation
/// - `events`: Explicit book lifecycle event registry
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{CatalogError, Result};

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::cache::{BookCache, CacheInvalidator, EntityCache, RedisCache};
use crate::db::{BookRepo, ReviewRepo};
use crate::events::BookEvents;
use crate::services::{Clock, RankingService, SystemClock};

/// Composition root. Wires the pool, cache, and lifecycle subscriptions;
/// the cache invalidator registration lives here and nowhere else.
pub struct CatalogService {
    pub books: BookRepo,
    pub reviews: ReviewRepo,
    pub rankings: RankingService,
    pub cache: BookCache,
    pub events: Arc<BookEvents>,
}

impl CatalogService {
    /// Connect to Postgres and Redis per `config` and assemble the service.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;
        let store = RedisCache::connect(&config.cache.url).await?;
        Ok(Self::assemble(pool, Arc::new(store)))
    }

    /// Assemble the service from an existing pool and cache store, reading
    /// preset windows from the system clock. Used by tests to swap in an
    /// in-memory cache.
    pub fn assemble(pool: PgPool, store: Arc<dyn EntityCache>) -> Self {
        Self::assemble_with_clock(pool, store, Arc::new(SystemClock))
    }

    /// Assemble with an explicit time source, so callers can pin `now`
    /// without rebuilding the wiring by hand.
    pub fn assemble_with_clock(
        pool: PgPool,
        store: Arc<dyn EntityCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = BookCache::new(store);
        let events = Arc::new(BookEvents::new());
        events.subscribe(Arc::new(CacheInvalidator::new(cache.clone())));

        Self {
            books: BookRepo::new(pool.clone(), events.clone()),
            reviews: ReviewRepo::new(pool.clone()),
            rankings: RankingService::new(pool).with_clock(clock),
            cache,
            events,
        }
    }
}
