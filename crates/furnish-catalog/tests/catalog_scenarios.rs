//! End-to-end catalog scenarios against in-memory backends.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use furnish_cache::CacheBackend;
use furnish_catalog::upload::ImageUpload;
use furnish_catalog::{CatalogService, UploadPolicy, keys};
use furnish_core::{PageRequest, Product, ProductDraft};
use furnish_db_memory::MemoryProductRepository;
use furnish_media::MemoryImageStore;
use furnish_storage::Cache;

struct Harness {
    service: CatalogService,
    cache: Arc<CacheBackend>,
    images: Arc<MemoryImageStore>,
}

fn harness() -> Harness {
    let cache = Arc::new(CacheBackend::new_local());
    let images = Arc::new(MemoryImageStore::new());
    let service = CatalogService::new(
        Arc::new(MemoryProductRepository::new()),
        images.clone(),
        cache.clone(),
        UploadPolicy::default(),
        Duration::from_secs(300),
    );
    Harness {
        service,
        cache,
        images,
    }
}

fn draft(name: &str, category: &str, price: f64) -> ProductDraft {
    ProductDraft {
        name: name.into(),
        description: format!("{name} for the living room"),
        price,
        category: category.into(),
        stock: 5,
    }
}

fn jpeg(filename: &str) -> ImageUpload {
    ImageUpload {
        data: Bytes::from_static(b"\xff\xd8\xff\xe0"),
        filename: filename.into(),
        content_type: "image/jpeg".into(),
    }
}

/// Detached cache tasks need a moment to land.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn get_populates_cache_and_serves_from_it() {
    let h = harness();
    let created = h
        .service
        .create_product(draft("Oak Table", "Tables", 250.0), None)
        .await
        .unwrap();

    let fetched = h.service.get_product(created.id).await.unwrap();
    assert_eq!(fetched.name, "Oak Table");
    settle().await;

    let cached = h.cache.get(&keys::product(created.id)).await;
    let stored: Product = serde_json::from_slice(&cached.expect("entry after read")).unwrap();
    assert_eq!(stored.id, created.id);

    // A second read must succeed straight from the cached bytes.
    let again = h.service.get_product(created.id).await.unwrap();
    assert_eq!(again.name, "Oak Table");
}

#[tokio::test]
async fn mutation_drops_stale_entry_and_refreshes_lists() {
    let h = harness();
    let created = h
        .service
        .create_product(draft("Oak Table", "Tables", 250.0), None)
        .await
        .unwrap();
    h.service.get_product(created.id).await.unwrap();
    settle().await;
    assert!(h.cache.get(&keys::product(created.id)).await.is_some());

    let mut renamed = draft("Walnut Table", "Tables", 300.0);
    renamed.stock = 2;
    h.service
        .update_product(created.id, renamed, None)
        .await
        .unwrap();
    settle().await;

    // The per-product key was refreshed or dropped, never left stale.
    if let Some(bytes) = h.cache.get(&keys::product(created.id)).await {
        let entry: Product = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(entry.name, "Walnut Table");
    }

    let all: Vec<Product> =
        serde_json::from_slice(&h.cache.get(&keys::product_list(None)).await.unwrap()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Walnut Table");

    let tables: Vec<Product> =
        serde_json::from_slice(&h.cache.get(&keys::product_list(Some("Tables"))).await.unwrap())
            .unwrap();
    assert_eq!(tables[0].price, 300.0);
}

#[tokio::test]
async fn category_change_refreshes_both_scopes() {
    let h = harness();
    let created = h
        .service
        .create_product(draft("Bench", "Seating", 80.0), None)
        .await
        .unwrap();
    settle().await;

    h.service
        .update_product(created.id, draft("Bench", "Outdoor", 80.0), None)
        .await
        .unwrap();
    settle().await;

    let seating: Vec<Product> = serde_json::from_slice(
        &h.cache
            .get(&keys::product_list(Some("Seating")))
            .await
            .unwrap(),
    )
    .unwrap();
    assert!(seating.is_empty(), "old category snapshot must be empty");

    let outdoor: Vec<Product> = serde_json::from_slice(
        &h.cache
            .get(&keys::product_list(Some("Outdoor")))
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(outdoor.len(), 1);
}

#[tokio::test]
async fn image_lifecycle_across_create_update_delete() {
    let h = harness();
    let created = h
        .service
        .create_product(draft("Sofa", "Seating", 900.0), Some(jpeg("sofa.jpg")))
        .await
        .unwrap();
    let first_url = created.image_url.clone().expect("url after upload");
    assert_eq!(h.images.len(), 1);

    let updated = h
        .service
        .update_product(created.id, draft("Sofa", "Seating", 850.0), Some(jpeg("sofa2.jpg")))
        .await
        .unwrap();
    let second_url = updated.image_url.clone().unwrap();
    assert_ne!(first_url, second_url);
    assert_eq!(h.images.len(), 1, "replaced blob must be deleted");
    assert!(h.images.get(&second_url).is_some());

    h.service.delete_product(created.id).await.unwrap();
    assert_eq!(h.images.len(), 0);

    let err = h.service.get_product(created.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn oversized_upload_is_rejected_before_storage() {
    let h = harness();
    let policy = UploadPolicy::new(8, vec!["image/jpeg".into()]);
    let service = CatalogService::new(
        Arc::new(MemoryProductRepository::new()),
        h.images.clone(),
        h.cache.clone(),
        policy,
        Duration::from_secs(300),
    );

    let big = ImageUpload {
        data: Bytes::from(vec![0u8; 9]),
        filename: "big.jpg".into(),
        content_type: "image/jpeg".into(),
    };
    let err = service
        .create_product(draft("Sofa", "Seating", 900.0), Some(big))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), furnish_catalog::ErrorKind::Validation);
    assert_eq!(h.images.len(), 0);
}

#[tokio::test]
async fn listing_paginates_with_clamped_inputs() {
    let h = harness();
    for i in 0..45 {
        h.service
            .create_product(draft(&format!("Item {i}"), "Decor", 10.0 + i as f64), None)
            .await
            .unwrap();
    }

    let first = h
        .service
        .list_products(Some("Decor"), PageRequest::new(1, 20))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 20);
    assert_eq!(first.total, 45);
    assert!(first.has_more());

    let last = h
        .service
        .list_products(Some("Decor"), PageRequest::new(3, 20))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 5);
    assert!(!last.has_more());

    // Page zero and an oversize page size fall back to the defaults.
    let clamped = h
        .service
        .list_products(None, PageRequest::new(0, 500))
        .await
        .unwrap();
    assert_eq!(clamped.page, 1);
    assert_eq!(clamped.page_size, furnish_core::DEFAULT_PAGE_SIZE);
}

#[tokio::test]
async fn search_matches_name_and_description_case_insensitively() {
    let h = harness();
    h.service
        .create_product(draft("Velvet Armchair", "Seating", 420.0), None)
        .await
        .unwrap();
    h.service
        .create_product(draft("Coffee Table", "Tables", 150.0), None)
        .await
        .unwrap();

    let by_name = h
        .service
        .search_products("ARMCHAIR", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);

    let by_description = h
        .service
        .search_products("living room", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(by_description.len(), 2);

    let none = h
        .service
        .search_products("wardrobe", PageRequest::default())
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn stock_update_is_visible_on_next_read() {
    let h = harness();
    let created = h
        .service
        .create_product(draft("Shelf", "Storage", 60.0), None)
        .await
        .unwrap();
    h.service.get_product(created.id).await.unwrap();
    settle().await;

    h.service.update_stock(created.id, 0).await.unwrap();
    settle().await;

    let fresh = h.service.get_product(created.id).await.unwrap();
    assert_eq!(fresh.stock, 0);
}
