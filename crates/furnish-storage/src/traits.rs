//! Collaborator traits consumed by the catalog and user services.
//!
//! All traits are object-safe and `Send + Sync`; services hold them as
//! `Arc<dyn …>` injected at construction. No backend is ever reached
//! through a process-wide singleton.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use furnish_core::{NewUser, Product, ProductDraft, ProductId, User, UserId};

use crate::error::{ImageStoreError, StorageError};

/// Durable product persistence.
///
/// The repository is the single source of truth for product records. It
/// assigns identifiers and timestamps on create and refreshes `updated_at`
/// on every successful update.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a new product and returns it with the assigned id and
    /// server-side timestamps.
    async fn create(
        &self,
        draft: &ProductDraft,
        image_url: Option<&str>,
    ) -> Result<Product, StorageError>;

    /// Fetches a product by id.
    ///
    /// Returns `None` when the id is unknown; errors are reserved for
    /// infrastructure failures.
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, StorageError>;

    /// Persists a full product snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is unknown.
    async fn update(&self, product: &Product) -> Result<Product, StorageError>;

    /// Deletes a product record. Deletion is terminal; there is no soft
    /// delete.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when zero rows were affected,
    /// which also covers the race where another deletion won.
    async fn delete(&self, id: ProductId) -> Result<(), StorageError>;

    /// Lists products ordered by recency, optionally filtered by category.
    async fn list(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StorageError>;

    /// Counts products matching the same filter as [`list`](Self::list).
    async fn count(&self, category: Option<&str>) -> Result<i64, StorageError>;

    /// Case-insensitive substring search over name and description.
    async fn search(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StorageError>;

    /// Sets the stock level for a product.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is unknown.
    async fn update_stock(&self, id: ProductId, stock: i32) -> Result<(), StorageError>;
}

/// Durable user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` on a duplicate email.
    async fn create(&self, user: &NewUser) -> Result<User, StorageError>;

    /// Fetches a user by email; `None` when unknown.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Fetches a user by id; `None` when unknown.
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StorageError>;
}

/// Best-effort TTL key-value cache.
///
/// The cache only ever holds derived, disposable copies. Backends must
/// degrade outages to misses and swallow write failures (logging them)
/// rather than surface errors to callers; the signatures are therefore
/// infallible. All operations must be safe to call from a detached
/// background task.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetches a serialized value; `None` on a miss, expiry, or backend
    /// outage.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores a serialized value with the given time-to-live.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);

    /// Removes a key if present.
    async fn delete(&self, key: &str);
}

/// Object storage for product images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Uploads a binary blob and returns its durable public URL.
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<String, ImageStoreError>;

    /// Deletes a previously uploaded blob by its public URL.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::InvalidUrl` when the URL does not point
    /// into this store.
    async fn delete(&self, url: &str) -> Result<(), ImageStoreError>;
}
