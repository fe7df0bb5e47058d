//! Product entity types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Opaque product identifier, assigned by the repository on create.
pub type ProductId = i64;

/// A catalog product as persisted by the repository.
///
/// The repository owns the durable state; any cached copy of this type is
/// derived and disposable. Timestamps are server-assigned and satisfy
/// `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Non-negative price in the shop currency.
    pub price: f64,
    /// Free-text category label used for list filtering.
    pub category: String,
    /// Non-negative units on hand.
    pub stock: i32,
    /// Public URL into the image store, if an image was uploaded.
    pub image_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Caller-supplied product fields for create and update operations.
///
/// Identity, image URL and timestamps are never caller-supplied; the
/// repository assigns the former and the catalog service manages the image
/// lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i32,
}

impl Product {
    /// Builds the persisted snapshot for an update: draft fields over the
    /// current record, keeping identity, image URL and `created_at`.
    #[must_use]
    pub fn with_draft(&self, draft: &ProductDraft) -> Self {
        Self {
            id: self.id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            category: draft.category.clone(),
            stock: draft.stock,
            image_url: self.image_url.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
