//! The catalog service.

use std::sync::Arc;
use std::time::Duration;

use furnish_core::{PageRequest, Product, ProductDraft, ProductId, ProductPage};
use furnish_storage::{Cache, ImageStore, ProductRepository, StorageError};

use crate::error::CatalogError;
use crate::keys;
use crate::upload::{ImageUpload, UploadPolicy};

/// Orchestrates repository, image store and cache for product operations.
///
/// All collaborators are injected; the service holds no global state.
/// Writes follow a two-step saga (image store first, then repository)
/// with forward-only compensation; cache maintenance happens on detached
/// tasks after the authoritative write has committed.
pub struct CatalogService {
    repo: Arc<dyn ProductRepository>,
    images: Arc<dyn ImageStore>,
    cache: Arc<dyn Cache>,
    policy: UploadPolicy,
    cache_ttl: Duration,
}

impl CatalogService {
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        images: Arc<dyn ImageStore>,
        cache: Arc<dyn Cache>,
        policy: UploadPolicy,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            images,
            cache,
            policy,
            cache_ttl,
        }
    }

    /// Creates a product, optionally with an image upload.
    ///
    /// Validation failures and upload failures abort before anything is
    /// persisted. If the repository insert fails after a successful
    /// upload, the fresh blob is deleted best-effort before the insert
    /// error is propagated. Duplicate submissions create duplicate rows;
    /// no deduplication is attempted.
    pub async fn create_product(
        &self,
        draft: ProductDraft,
        upload: Option<ImageUpload>,
    ) -> Result<Product, CatalogError> {
        check_draft(&draft)?;

        let image_url = match upload {
            Some(upload) => {
                self.policy.check(&upload)?;
                let url = self
                    .images
                    .upload(upload.data, &upload.filename, &upload.content_type)
                    .await?;
                Some(url)
            }
            None => None,
        };

        match self.repo.create(&draft, image_url.as_deref()).await {
            Ok(product) => {
                tracing::info!(id = product.id, category = %product.category, "product created");
                // A new id has no single-product cache entry yet.
                self.refresh_list_caches(vec![product.category.clone()], None);
                Ok(product)
            }
            Err(err) => {
                if let Some(url) = image_url {
                    self.discard_image(&url, "create rollback").await;
                }
                Err(err.into())
            }
        }
    }

    /// Updates a product from a full draft snapshot, optionally replacing
    /// its image.
    ///
    /// The old image is deleted only after the repository write for the
    /// new state has committed. If the write fails and a new image was
    /// uploaded, the new (orphaned) blob is deleted and the old image is
    /// left untouched.
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: ProductDraft,
        upload: Option<ImageUpload>,
    ) -> Result<Product, CatalogError> {
        check_draft(&draft)?;

        let current = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(id))?;

        let new_image_url = match upload {
            Some(upload) => {
                self.policy.check(&upload)?;
                let url = self
                    .images
                    .upload(upload.data, &upload.filename, &upload.content_type)
                    .await?;
                Some(url)
            }
            None => None,
        };

        let mut next = current.with_draft(&draft);
        if let Some(ref url) = new_image_url {
            next.image_url = Some(url.clone());
        }

        match self.repo.update(&next).await {
            Ok(updated) => {
                if new_image_url.is_some() {
                    // Replacement confirmed; the old blob is now unreferenced.
                    if let Some(ref old_url) = current.image_url {
                        self.discard_image(old_url, "replaced image").await;
                    }
                }

                let mut categories = vec![current.category.clone()];
                if updated.category != current.category {
                    categories.push(updated.category.clone());
                }
                self.refresh_list_caches(categories, Some(id));

                tracing::info!(id, "product updated");
                Ok(updated)
            }
            Err(err) => {
                if let Some(ref url) = new_image_url {
                    self.discard_image(url, "update rollback").await;
                }
                Err(map_repo_error(err, id))
            }
        }
    }

    /// Deletes a product and its stored image.
    ///
    /// The image delete is best-effort and never blocks record deletion:
    /// an orphaned blob is preferable to an undeletable record. A second
    /// delete of the same id reports `NotFound`.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        let current = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(id))?;

        if let Some(ref url) = current.image_url {
            self.discard_image(url, "product delete").await;
        }

        self.repo
            .delete(id)
            .await
            .map_err(|err| map_repo_error(err, id))?;

        tracing::info!(id, "product deleted");
        self.refresh_list_caches(vec![current.category], Some(id));
        Ok(())
    }

    /// Fetches a product, serving from the cache when possible.
    ///
    /// A cache outage degrades to a miss. On a miss the repository is
    /// read and the cache is populated from a detached task; the caller
    /// never waits on, or fails because of, that write.
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = keys::product(id);

        if let Some(bytes) = self.cache.get(&key).await {
            match serde_json::from_slice::<Product>(&bytes) {
                Ok(product) => return Ok(product),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "dropping undecodable cache entry");
                    self.cache.delete(&key).await;
                }
            }
        }

        let product = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(id))?;

        let cache = Arc::clone(&self.cache);
        let ttl = self.cache_ttl;
        let snapshot = product.clone();
        tokio::spawn(async move {
            match serde_json::to_vec(&snapshot) {
                Ok(bytes) => cache.set(&keys::product(snapshot.id), bytes, ttl).await,
                Err(err) => tracing::warn!(id = snapshot.id, error = %err, "cache encode failed"),
            }
        });

        Ok(product)
    }

    /// Lists one page of products with the total count for the same
    /// filter.
    ///
    /// The read path always queries the repository for both the page and
    /// the count; the coarse list keys are refreshed by mutations only
    /// and are never trusted for pagination.
    pub async fn list_products(
        &self,
        category: Option<&str>,
        page: PageRequest,
    ) -> Result<ProductPage, CatalogError> {
        let items = self
            .repo
            .list(category, page.limit(), page.offset())
            .await?;
        let total = self.repo.count(category).await?;
        Ok(ProductPage::new(items, total, page))
    }

    /// Case-insensitive substring search over name and description.
    /// Bypasses the cache entirely.
    pub async fn search_products(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Vec<Product>, CatalogError> {
        Ok(self.repo.search(query, page.limit(), page.offset()).await?)
    }

    /// Sets the stock level for a product.
    pub async fn update_stock(&self, id: ProductId, stock: i32) -> Result<(), CatalogError> {
        if stock < 0 {
            return Err(CatalogError::invalid_field("stock must be non-negative"));
        }

        let current = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found(id))?;

        self.repo
            .update_stock(id, stock)
            .await
            .map_err(|err| map_repo_error(err, id))?;

        self.refresh_list_caches(vec![current.category], Some(id));
        Ok(())
    }

    /// Best-effort image delete for compensation and cleanup paths.
    ///
    /// Failures are logged and dropped; retrying cleanup indefinitely is
    /// out of scope, and an orphaned blob is an accepted outcome.
    async fn discard_image(&self, url: &str, reason: &str) {
        if let Err(err) = self.images.delete(url).await {
            tracing::warn!(url = %url, reason, error = %err, "image cleanup failed");
        }
    }

    /// Fire-and-forget cache maintenance after a successful mutation.
    ///
    /// Drops the single-product key (when given) and the affected list
    /// keys, then stores a fresh first-page snapshot per affected scope.
    /// Runs entirely off the caller's path.
    fn refresh_list_caches(&self, categories: Vec<String>, product_id: Option<ProductId>) {
        let repo = Arc::clone(&self.repo);
        let cache = Arc::clone(&self.cache);
        let ttl = self.cache_ttl;

        tokio::spawn(async move {
            if let Some(id) = product_id {
                cache.delete(&keys::product(id)).await;
            }

            let mut scopes: Vec<Option<String>> = vec![None];
            scopes.extend(categories.into_iter().map(Some));

            for scope in scopes {
                let key = keys::product_list(scope.as_deref());
                cache.delete(&key).await;

                match repo
                    .list(scope.as_deref(), PageRequest::default().limit(), 0)
                    .await
                {
                    Ok(items) => match serde_json::to_vec(&items) {
                        Ok(bytes) => cache.set(&key, bytes, ttl).await,
                        Err(err) => {
                            tracing::warn!(key = %key, error = %err, "cache encode failed");
                        }
                    },
                    Err(err) => {
                        tracing::warn!(key = %key, error = %err, "list cache refresh skipped");
                    }
                }
            }
        });
    }
}

/// Field invariants checked before any side effect.
fn check_draft(draft: &ProductDraft) -> Result<(), CatalogError> {
    if draft.name.trim().is_empty() {
        return Err(CatalogError::invalid_field("name must not be empty"));
    }
    if draft.category.trim().is_empty() {
        return Err(CatalogError::invalid_field("category must not be empty"));
    }
    if !(draft.price >= 0.0) {
        return Err(CatalogError::invalid_field("price must be non-negative"));
    }
    if draft.stock < 0 {
        return Err(CatalogError::invalid_field("stock must be non-negative"));
    }
    Ok(())
}

/// Maps a repository NotFound (e.g. a lost delete race) onto the catalog
/// taxonomy; everything else is surfaced as a dependency failure.
fn map_repo_error(err: StorageError, id: ProductId) -> CatalogError {
    if err.is_not_found() {
        CatalogError::not_found(id)
    } else {
        CatalogError::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use furnish_storage::ImageStoreError;
    use time::OffsetDateTime;

    fn draft(name: &str, category: &str) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            description: "desc".into(),
            price: 10.0,
            category: category.into(),
            stock: 3,
        }
    }

    fn png_upload() -> ImageUpload {
        ImageUpload {
            data: Bytes::from_static(b"\x89PNG"),
            filename: "photo.png".into(),
            content_type: "image/png".into(),
        }
    }

    fn product(id: ProductId) -> Product {
        let now = OffsetDateTime::now_utc();
        Product {
            id,
            name: "Chair".into(),
            description: "desc".into(),
            price: 10.0,
            category: "Seating".into(),
            stock: 3,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Repository double with per-operation failure switches and call
    /// counters.
    #[derive(Default)]
    struct ScriptedRepo {
        fail_create: AtomicBool,
        fail_update: AtomicBool,
        current: Mutex<Option<Product>>,
        get_calls: AtomicUsize,
    }

    impl ScriptedRepo {
        fn with_current(product: Product) -> Self {
            Self {
                current: Mutex::new(Some(product)),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ProductRepository for ScriptedRepo {
        async fn create(
            &self,
            draft: &ProductDraft,
            image_url: Option<&str>,
        ) -> Result<Product, StorageError> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(StorageError::connection("insert failed"));
            }
            let now = OffsetDateTime::now_utc();
            Ok(Product {
                id: 1,
                name: draft.name.clone(),
                description: draft.description.clone(),
                price: draft.price,
                category: draft.category.clone(),
                stock: draft.stock,
                image_url: image_url.map(str::to_owned),
                created_at: now,
                updated_at: now,
            })
        }

        async fn get_by_id(&self, _id: ProductId) -> Result<Option<Product>, StorageError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.current.lock().unwrap().clone())
        }

        async fn update(&self, product: &Product) -> Result<Product, StorageError> {
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(StorageError::connection("update failed"));
            }
            let mut updated = product.clone();
            updated.updated_at = OffsetDateTime::now_utc();
            *self.current.lock().unwrap() = Some(updated.clone());
            Ok(updated)
        }

        async fn delete(&self, id: ProductId) -> Result<(), StorageError> {
            let mut current = self.current.lock().unwrap();
            if current.take().is_none() {
                return Err(StorageError::not_found("product", id));
            }
            Ok(())
        }

        async fn list(
            &self,
            _category: Option<&str>,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<Product>, StorageError> {
            Ok(Vec::new())
        }

        async fn count(&self, _category: Option<&str>) -> Result<i64, StorageError> {
            Ok(0)
        }

        async fn search(
            &self,
            _query: &str,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<Product>, StorageError> {
            Ok(Vec::new())
        }

        async fn update_stock(&self, id: ProductId, stock: i32) -> Result<(), StorageError> {
            let mut current = self.current.lock().unwrap();
            match current.as_mut() {
                Some(p) => {
                    p.stock = stock;
                    Ok(())
                }
                None => Err(StorageError::not_found("product", id)),
            }
        }
    }

    /// Image store double recording uploads and deletes in order.
    #[derive(Default)]
    struct RecordingImageStore {
        uploads: AtomicUsize,
        deleted: Mutex<Vec<String>>,
        fail_upload: AtomicBool,
    }

    #[async_trait]
    impl ImageStore for RecordingImageStore {
        async fn upload(
            &self,
            _data: Bytes,
            filename: &str,
            _content_type: &str,
        ) -> Result<String, ImageStoreError> {
            if self.fail_upload.load(Ordering::SeqCst) {
                return Err(ImageStoreError::transport("upload refused"));
            }
            let n = self.uploads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://img.test/products/{n}-{filename}"))
        }

        async fn delete(&self, url: &str) -> Result<(), ImageStoreError> {
            self.deleted.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    /// No-op cache: every read is a miss.
    struct MissCache;

    #[async_trait]
    impl Cache for MissCache {
        async fn get(&self, _key: &str) -> Option<Vec<u8>> {
            None
        }
        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) {}
        async fn delete(&self, _key: &str) {}
    }

    /// Map-backed cache double, ignores TTL.
    #[derive(Default)]
    struct MapCache {
        entries: Mutex<std::collections::HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl Cache for MapCache {
        async fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.entries.lock().unwrap().get(key).cloned()
        }
        async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) {
            self.entries.lock().unwrap().insert(key.to_string(), value);
        }
        async fn delete(&self, key: &str) {
            self.entries.lock().unwrap().remove(key);
        }
    }

    fn service(repo: Arc<ScriptedRepo>, images: Arc<RecordingImageStore>) -> CatalogService {
        CatalogService::new(
            repo,
            images,
            Arc::new(MissCache),
            UploadPolicy::default(),
            Duration::from_secs(60),
        )
    }

    #[tokio::test]
    async fn create_rejects_invalid_upload_with_no_side_effects() {
        let repo = Arc::new(ScriptedRepo::default());
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(Arc::clone(&repo), Arc::clone(&images));

        let bad = ImageUpload {
            data: Bytes::from_static(b"x"),
            filename: "malware.exe".into(),
            content_type: "image/png".into(),
        };
        let err = svc
            .create_product(draft("Chair", "Seating"), Some(bad))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
        assert_eq!(images.uploads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_rejects_negative_price() {
        let repo = Arc::new(ScriptedRepo::default());
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(repo, images);

        let mut d = draft("Chair", "Seating");
        d.price = -1.0;
        let err = svc.create_product(d, None).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn failed_insert_compensates_by_deleting_upload_once() {
        let repo = Arc::new(ScriptedRepo::default());
        repo.fail_create.store(true, Ordering::SeqCst);
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(Arc::clone(&repo), Arc::clone(&images));

        let err = svc
            .create_product(draft("Chair", "Seating"), Some(png_upload()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Dependency);

        let deleted = images.deleted.lock().unwrap().clone();
        assert_eq!(deleted.len(), 1, "compensation delete must run exactly once");
        assert!(deleted[0].contains("photo.png"));
    }

    #[tokio::test]
    async fn failed_upload_aborts_before_any_persistence() {
        let repo = Arc::new(ScriptedRepo::default());
        let images = Arc::new(RecordingImageStore::default());
        images.fail_upload.store(true, Ordering::SeqCst);
        let svc = service(Arc::clone(&repo), Arc::clone(&images));

        let err = svc
            .create_product(draft("Chair", "Seating"), Some(png_upload()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Dependency);
        assert!(images.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replacing_image_deletes_old_only_after_success() {
        let mut existing = product(7);
        existing.image_url = Some("https://img.test/products/old.png".into());
        let repo = Arc::new(ScriptedRepo::with_current(existing));
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(Arc::clone(&repo), Arc::clone(&images));

        let updated = svc
            .update_product(7, draft("Chair", "Seating"), Some(png_upload()))
            .await
            .unwrap();
        assert!(updated.image_url.as_deref().unwrap().contains("photo.png"));

        let deleted = images.deleted.lock().unwrap().clone();
        assert_eq!(deleted, vec!["https://img.test/products/old.png".to_string()]);
    }

    #[tokio::test]
    async fn failed_update_deletes_orphan_and_keeps_old_image() {
        let mut existing = product(7);
        existing.image_url = Some("https://img.test/products/old.png".into());
        let repo = Arc::new(ScriptedRepo::with_current(existing));
        repo.fail_update.store(true, Ordering::SeqCst);
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(Arc::clone(&repo), Arc::clone(&images));

        let err = svc
            .update_product(7, draft("Chair", "Seating"), Some(png_upload()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Dependency);

        let deleted = images.deleted.lock().unwrap().clone();
        assert_eq!(deleted.len(), 1);
        assert!(
            deleted[0].contains("photo.png"),
            "only the orphaned new image may be deleted, got {deleted:?}"
        );
    }

    #[tokio::test]
    async fn update_without_upload_keeps_image_url() {
        let mut existing = product(7);
        existing.image_url = Some("https://img.test/products/old.png".into());
        let repo = Arc::new(ScriptedRepo::with_current(existing));
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(Arc::clone(&repo), Arc::clone(&images));

        let mut d = draft("Chair", "Seating");
        d.stock = 0;
        let updated = svc.update_product(7, d, None).await.unwrap();
        assert_eq!(updated.stock, 0);
        assert_eq!(
            updated.image_url.as_deref(),
            Some("https://img.test/products/old.png")
        );
        assert!(images.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let repo = Arc::new(ScriptedRepo::default());
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(repo, images);

        let err = svc
            .update_product(99, draft("Chair", "Seating"), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_image_and_is_not_idempotent() {
        let mut existing = product(7);
        existing.image_url = Some("https://img.test/products/old.png".into());
        let repo = Arc::new(ScriptedRepo::with_current(existing));
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(Arc::clone(&repo), Arc::clone(&images));

        svc.delete_product(7).await.unwrap();
        assert_eq!(images.deleted.lock().unwrap().len(), 1);

        let err = svc.delete_product(7).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn cached_get_does_not_touch_repository() {
        let repo = Arc::new(ScriptedRepo::with_current(product(7)));
        let images = Arc::new(RecordingImageStore::default());
        let svc = CatalogService::new(
            repo.clone(),
            images,
            Arc::new(MapCache::default()),
            UploadPolicy::default(),
            Duration::from_secs(60),
        );

        svc.get_product(7).await.unwrap();
        // Population runs on a detached task.
        tokio::time::sleep(Duration::from_millis(50)).await;
        svc.get_product(7).await.unwrap();

        assert_eq!(repo.get_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn corrupt_cache_entry_is_dropped_and_repaired() {
        let repo = Arc::new(ScriptedRepo::with_current(product(7)));
        let images = Arc::new(RecordingImageStore::default());
        let cache = Arc::new(MapCache::default());
        let svc = CatalogService::new(
            repo.clone(),
            images,
            cache.clone(),
            UploadPolicy::default(),
            Duration::from_secs(60),
        );

        cache
            .set(&keys::product(7), b"not json".to_vec(), Duration::from_secs(60))
            .await;

        let product = svc.get_product(7).await.unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(repo.get_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_stock_validates_and_propagates_not_found() {
        let repo = Arc::new(ScriptedRepo::with_current(product(7)));
        let images = Arc::new(RecordingImageStore::default());
        let svc = service(Arc::clone(&repo), images);

        let err = svc.update_stock(7, -1).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);

        svc.update_stock(7, 0).await.unwrap();
        assert_eq!(repo.current.lock().unwrap().as_ref().unwrap().stock, 0);
    }
}
