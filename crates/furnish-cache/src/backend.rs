//! Cache backend with a local (DashMap) tier and an optional Redis tier.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use furnish_storage::Cache;

/// A cached entry with TTL support.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    data: Vec<u8>,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedEntry {
    /// Create a new cached entry.
    #[must_use]
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Cache backend in one of two modes.
///
/// - **Local**: single-instance, DashMap only.
/// - **Redis**: DashMap (L1) in front of a shared Redis (L2); L2 hits are
///   promoted to L1, and L2 writes/deletes run off the caller's path.
///
/// Redis outages are logged at `warn` and treated as misses; the catalog
/// service never observes a cache failure.
#[derive(Clone)]
pub enum CacheBackend {
    /// Single-instance: local DashMap only.
    Local(Arc<DashMap<String, CachedEntry>>),

    /// Redis L2 with a local L1.
    Redis {
        redis: Pool,
        local: Arc<DashMap<String, CachedEntry>>,
    },
}

impl CacheBackend {
    /// Create a new local-only cache backend.
    #[must_use]
    pub fn new_local() -> Self {
        CacheBackend::Local(Arc::new(DashMap::new()))
    }

    /// Create a new Redis-backed cache backend.
    #[must_use]
    pub fn new_redis(redis_pool: Pool) -> Self {
        CacheBackend::Redis {
            redis: redis_pool,
            local: Arc::new(DashMap::new()),
        }
    }

    /// Get a value, checking L1 before L2. An L2 hit is promoted to L1.
    pub async fn get_value(&self, key: &str) -> Option<Vec<u8>> {
        match self {
            CacheBackend::Local(map) => map
                .get(key)
                .filter(|entry| !entry.is_expired())
                .map(|entry| entry.data.clone()),
            CacheBackend::Redis { redis, local } => {
                if let Some(entry) = local.get(key) {
                    if !entry.is_expired() {
                        tracing::debug!(key = %key, "cache hit (L1)");
                        return Some(entry.data.clone());
                    }
                    drop(entry);
                    local.remove(key);
                }

                match redis.get().await {
                    Ok(mut conn) => match conn.get::<_, Option<Vec<u8>>>(key).await {
                        Ok(Some(data)) => {
                            tracing::debug!(key = %key, "cache hit (L2)");
                            local.insert(
                                key.to_string(),
                                CachedEntry::new(data.clone(), Duration::from_secs(3600)),
                            );
                            Some(data)
                        }
                        Ok(None) => None,
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "Redis GET error");
                            None
                        }
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to get Redis connection");
                        None
                    }
                }
            }
        }
    }

    /// Set a value with TTL. Redis writes are fire-and-forget.
    pub async fn set_value(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        match self {
            CacheBackend::Local(map) => {
                map.insert(key.to_string(), CachedEntry::new(value, ttl));
            }
            CacheBackend::Redis { redis, local } => {
                local.insert(key.to_string(), CachedEntry::new(value.clone(), ttl));

                let redis = redis.clone();
                let key = key.to_string();
                let ttl_secs = ttl.as_secs().max(1);
                tokio::spawn(async move {
                    if let Ok(mut conn) = redis.get().await {
                        if let Err(e) =
                            conn.set_ex::<_, _, ()>(&key, value.as_slice(), ttl_secs).await
                        {
                            tracing::warn!(key = %key, error = %e, "Redis SET error");
                        }
                    }
                });
            }
        }
    }

    /// Remove a key from every tier. Redis deletes are fire-and-forget.
    pub async fn delete_value(&self, key: &str) {
        match self {
            CacheBackend::Local(map) => {
                map.remove(key);
            }
            CacheBackend::Redis { redis, local } => {
                local.remove(key);

                let redis = redis.clone();
                let key = key.to_string();
                tokio::spawn(async move {
                    if let Ok(mut conn) = redis.get().await {
                        if let Err(e) = conn.del::<_, ()>(&key).await {
                            tracing::warn!(key = %key, error = %e, "Redis DEL error");
                        }
                    }
                });
            }
        }
    }

    /// L1 statistics, mostly for health endpoints.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        match self {
            CacheBackend::Local(map) => CacheStats {
                l1_entries: map.len(),
                mode: "local",
            },
            CacheBackend::Redis { local, .. } => CacheStats {
                l1_entries: local.len(),
                mode: "redis",
            },
        }
    }
}

#[async_trait]
impl Cache for CacheBackend {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.get_value(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        self.set_value(key, value, ttl).await;
    }

    async fn delete(&self, key: &str) {
        self.delete_value(key).await;
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub l1_entries: usize,
    pub mode: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_get_set() {
        let cache = CacheBackend::new_local();
        cache
            .set_value("k", b"value".to_vec(), Duration::from_secs(60))
            .await;

        assert_eq!(cache.get_value("k").await, Some(b"value".to_vec()));

        let stats = cache.stats();
        assert_eq!(stats.mode, "local");
        assert_eq!(stats.l1_entries, 1);
    }

    #[tokio::test]
    async fn local_entries_expire() {
        let cache = CacheBackend::new_local();
        cache
            .set_value("k", b"v".to_vec(), Duration::from_millis(50))
            .await;

        assert!(cache.get_value("k").await.is_some());
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.get_value("k").await.is_none());
    }

    #[tokio::test]
    async fn local_delete_removes_entry() {
        let cache = CacheBackend::new_local();
        cache
            .set_value("k", b"v".to_vec(), Duration::from_secs(60))
            .await;
        cache.delete_value("k").await;
        assert!(cache.get_value("k").await.is_none());
    }

    #[tokio::test]
    async fn trait_object_round_trip() {
        let cache: Arc<dyn Cache> = Arc::new(CacheBackend::new_local());
        cache.set("k", b"v".to_vec(), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(b"v".to_vec()));
        cache.delete("k").await;
        assert!(cache.get("k").await.is_none());
    }
}
