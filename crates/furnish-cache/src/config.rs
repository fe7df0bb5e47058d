//! Cache configuration and backend factory.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::CacheBackend;

/// Which cache backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Single-instance DashMap cache.
    #[default]
    Local,
    /// DashMap L1 plus shared Redis L2.
    Redis,
}

/// Cache section of the application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub mode: CacheMode,
    /// Time-to-live for catalog cache entries, in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::Local,
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL (e.g. "redis://localhost:6379").
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size.
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    8
}

fn default_redis_timeout_ms() -> u64 {
    2_000
}

/// Create a cache backend for the configured mode.
///
/// Redis failures never prevent startup: if the pool cannot be created or
/// the first connection fails, the backend falls back to local-only mode
/// with a warning.
pub async fn create_cache_backend(mode: CacheMode, redis: &RedisConfig) -> CacheBackend {
    if mode == CacheMode::Local {
        tracing::info!("cache: local mode");
        return CacheBackend::new_local();
    }

    tracing::info!(url = %redis.url, "cache: connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&redis.url);
    if let Some(ref mut pool_config) = redis_config.pool {
        pool_config.max_size = redis.pool_size;
        pool_config.timeouts.wait = Some(Duration::from_millis(redis.timeout_ms));
        pool_config.timeouts.create = Some(Duration::from_millis(redis.timeout_ms));
        pool_config.timeouts.recycle = Some(Duration::from_millis(redis.timeout_ms));
    }

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "failed to create Redis pool, falling back to local cache");
            return CacheBackend::new_local();
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("cache: connected to Redis");
            CacheBackend::new_redis(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unreachable, falling back to local cache");
            CacheBackend::new_local()
        }
    }
}
