//! Shared application state and backend wiring.

use std::sync::Arc;

use furnish_auth::{JwtManager, TokenIssuer, UserService};
use furnish_cache::{CacheBackend, create_cache_backend};
use furnish_catalog::{CatalogService, UploadPolicy};
use furnish_db_memory::{MemoryProductRepository, MemoryUserRepository};
use furnish_db_postgres::{PostgresProductRepository, PostgresUserRepository};
use furnish_media::{MemoryImageStore, S3ImageStore};
use furnish_storage::{Cache, ImageStore, ProductRepository, UserRepository};

use crate::config::{AppConfig, MediaMode, StorageMode};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub users: Arc<UserService>,
    pub tokens: Arc<dyn TokenIssuer>,
    /// Kept concrete so the health endpoint can report cache statistics.
    pub cache: Arc<CacheBackend>,
}

/// Wires repositories, cache, image store and services from the config.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let (products, users): (Arc<dyn ProductRepository>, Arc<dyn UserRepository>) =
        match cfg.storage.mode {
            StorageMode::Postgres => {
                let pool = furnish_db_postgres::connect(&cfg.storage.postgres).await?;
                (
                    Arc::new(PostgresProductRepository::new(pool.clone())),
                    Arc::new(PostgresUserRepository::new(pool)),
                )
            }
            StorageMode::Memory => {
                tracing::warn!("using in-memory storage, data is lost on restart");
                (
                    Arc::new(MemoryProductRepository::new()),
                    Arc::new(MemoryUserRepository::new()),
                )
            }
        };

    let images: Arc<dyn ImageStore> = match cfg.media.mode {
        MediaMode::S3 => Arc::new(S3ImageStore::new(&cfg.media.s3)),
        MediaMode::Memory => {
            tracing::warn!("using in-memory image store, blobs are lost on restart");
            Arc::new(MemoryImageStore::new())
        }
    };

    let cache = Arc::new(create_cache_backend(cfg.cache.mode, &cfg.redis).await);

    let policy = UploadPolicy::new(cfg.upload.max_bytes, cfg.upload.allowed_types.clone());
    let shared_cache: Arc<dyn Cache> = cache.clone();
    let catalog = Arc::new(CatalogService::new(
        products,
        images,
        shared_cache,
        policy,
        cfg.cache.ttl(),
    ));

    let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtManager::new(
        &cfg.auth.jwt_secret,
        time::Duration::seconds(cfg.auth.token_ttl_secs as i64),
    ));
    let users = Arc::new(UserService::new(users, Arc::clone(&tokens)));

    Ok(AppState {
        catalog,
        users,
        tokens,
        cache,
    })
}
