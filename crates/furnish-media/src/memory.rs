//! In-memory image store for the `memory` mode and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use furnish_storage::{ImageStore, ImageStoreError};

const URL_PREFIX: &str = "memory://images/";

/// A stored blob, kept so tests can assert on what was uploaded.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub data: Bytes,
    pub content_type: String,
}

/// Map-backed image store.
///
/// Delete of an unknown-but-well-formed URL succeeds, matching S3's
/// idempotent DeleteObject; only URLs outside this store's namespace are
/// rejected.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    blobs: DashMap<String, StoredImage>,
    next_id: AtomicU64,
}

impl MemoryImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Fetches a stored blob by URL, for assertions in tests.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<StoredImage> {
        self.blobs.get(url).map(|e| e.value().clone())
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<String, ImageStoreError> {
        let ext = filename
            .rfind('.')
            .map(|i| &filename[i..])
            .unwrap_or_default()
            .to_ascii_lowercase();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let url = format!("{URL_PREFIX}{id}{ext}");
        self.blobs.insert(
            url.clone(),
            StoredImage {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), ImageStoreError> {
        if !url.starts_with(URL_PREFIX) {
            return Err(ImageStoreError::invalid_url(url));
        }
        self.blobs.remove(url);
        Ok(())
    }
}
