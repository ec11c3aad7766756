//! In-memory entity cache over a concurrent map.

use async_trait::async_trait;
use dashmap::DashMap;

use super::EntityCache;
use crate::error::Result;

#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl EntityCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_evict_roundtrip() {
        let cache = MemoryCache::new();
        cache.put("book:1", "payload").await.unwrap();
        assert_eq!(cache.get("book:1").await.unwrap().as_deref(), Some("payload"));

        cache.evict("book:1").await.unwrap();
        assert_eq!(cache.get("book:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_evicting_absent_key_is_noop() {
        let cache = MemoryCache::new();
        cache.evict("book:missing").await.unwrap();
        cache.evict("book:missing").await.unwrap();
        assert!(cache.is_empty());
    }
}
