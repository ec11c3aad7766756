//! Redis-backed entity cache.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;

use super::EntityCache;
use crate::error::Result;

#[derive(Clone)]
pub struct RedisCache {
    redis: ConnectionManager,
}

impl RedisCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;
        Ok(Self { redis })
    }
}

#[async_trait]
impl EntityCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(key).await?;
        match &value {
            Some(_) => debug!("cache HIT for {}", key),
            None => debug!("cache MISS for {}", key),
        }
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.set::<_, _, ()>(key, value).await?;
        debug!("cache WRITE for {}", key);
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<()> {
        // DEL on an absent key deletes zero rows and still succeeds.
        let mut conn = self.redis.clone();
        conn.del::<_, ()>(key).await?;
        debug!("cache EVICT for {}", key);
        Ok(())
    }
}
