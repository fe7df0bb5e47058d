//! TTL cache backends for catalog reads.
//!
//! Two modes, mirroring the deployment options:
//!
//! - **Local**: single-instance, DashMap with per-entry TTL.
//! - **Redis**: DashMap L1 plus a shared Redis L2 (deadpool-redis).
//!
//! The cache is never authoritative: every error path degrades to a miss,
//! L2 writes and deletes are fire-and-forget, and nothing here can fail a
//! caller of the catalog service.

pub mod backend;
pub mod config;

pub use backend::{CacheBackend, CacheStats, CachedEntry};
pub use config::{CacheConfig, CacheMode, RedisConfig, create_cache_backend};
