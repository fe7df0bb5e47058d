//! In-memory `ProductRepository` backend.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;

use furnish_core::{Product, ProductDraft, ProductId};
use furnish_storage::{ProductRepository, StorageError};

/// Map-backed product repository.
///
/// Ids are assigned from a monotonically increasing counter, so ordering
/// by id descending matches the Postgres backend's recency ordering even
/// when two rows share a creation timestamp.
#[derive(Debug, Default)]
pub struct MemoryProductRepository {
    rows: DashMap<ProductId, Product>,
    next_id: AtomicI64,
}

impl MemoryProductRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Snapshot of matching rows, newest first.
    fn matching(&self, category: Option<&str>) -> Vec<Product> {
        let mut rows: Vec<Product> = self
            .rows
            .iter()
            .filter(|entry| category.is_none_or(|c| entry.value().category == c))
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows
    }

    fn page(rows: Vec<Product>, limit: i64, offset: i64) -> Vec<Product> {
        rows.into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect()
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(
        &self,
        draft: &ProductDraft,
        image_url: Option<&str>,
    ) -> Result<Product, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = OffsetDateTime::now_utc();
        let product = Product {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            category: draft.category.clone(),
            stock: draft.stock,
            image_url: image_url.map(str::to_owned),
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, product.clone());
        Ok(product)
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, StorageError> {
        Ok(self.rows.get(&id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, product: &Product) -> Result<Product, StorageError> {
        let mut entry = self
            .rows
            .get_mut(&product.id)
            .ok_or_else(|| StorageError::not_found("product", product.id))?;
        let mut updated = product.clone();
        updated.created_at = entry.value().created_at;
        updated.updated_at = OffsetDateTime::now_utc().max(updated.created_at);
        *entry.value_mut() = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> Result<(), StorageError> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("product", id))
    }

    async fn list(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StorageError> {
        Ok(Self::page(self.matching(category), limit, offset))
    }

    async fn count(&self, category: Option<&str>) -> Result<i64, StorageError> {
        Ok(self.matching(category).len() as i64)
    }

    async fn search(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StorageError> {
        let needle = query.to_lowercase();
        let rows = self
            .matching(None)
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect();
        Ok(Self::page(rows, limit, offset))
    }

    async fn update_stock(&self, id: ProductId, stock: i32) -> Result<(), StorageError> {
        let mut entry = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("product", id))?;
        entry.value_mut().stock = stock;
        entry.value_mut().updated_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, category: &str) -> ProductDraft {
        ProductDraft {
            name: name.into(),
            description: format!("{name} description"),
            price: 10.0,
            category: category.into(),
            stock: 5,
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let repo = MemoryProductRepository::new();
        let a = repo.create(&draft("Chair", "Seating"), None).await.unwrap();
        let b = repo.create(&draft("Table", "Tables"), None).await.unwrap();
        assert_ne!(a.id, 0);
        assert_ne!(a.id, b.id);
        assert!(a.updated_at >= a.created_at);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let repo = MemoryProductRepository::new();
        let mut product = repo.create(&draft("Chair", "Seating"), None).await.unwrap();
        product.id = 999;
        let err = repo.update(&product).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let repo = MemoryProductRepository::new();
        let product = repo.create(&draft("Chair", "Seating"), None).await.unwrap();
        repo.delete(product.id).await.unwrap();
        assert!(repo.delete(product.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let repo = MemoryProductRepository::new();
        for i in 0..45 {
            repo.create(&draft(&format!("Chair {i}"), "Seating"), None)
                .await
                .unwrap();
        }
        repo.create(&draft("Table", "Tables"), None).await.unwrap();

        assert_eq!(repo.count(Some("Seating")).await.unwrap(), 45);
        assert_eq!(repo.count(None).await.unwrap(), 46);

        let page3 = repo.list(Some("Seating"), 20, 40).await.unwrap();
        assert_eq!(page3.len(), 5);
    }

    #[tokio::test]
    async fn list_orders_by_recency() {
        let repo = MemoryProductRepository::new();
        repo.create(&draft("Old", "Seating"), None).await.unwrap();
        let newest = repo.create(&draft("New", "Seating"), None).await.unwrap();
        let rows = repo.list(None, 10, 0).await.unwrap();
        assert_eq!(rows.first().unwrap().id, newest.id);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let repo = MemoryProductRepository::new();
        repo.create(&draft("Oak Chair", "Seating"), None)
            .await
            .unwrap();
        repo.create(&draft("Pine Table", "Tables"), None)
            .await
            .unwrap();

        let hits = repo.search("OAK", 10, 0).await.unwrap();
        assert_eq!(hits.len(), 1);
        // Matches descriptions too.
        let hits = repo.search("pine table desc", 10, 0).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
