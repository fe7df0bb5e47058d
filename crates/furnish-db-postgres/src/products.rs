//! Product repository over PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use furnish_core::{Product, ProductDraft, ProductId};
use furnish_storage::{ProductRepository, StorageError};

use crate::error::map_sqlx;

/// Column order shared by every product query.
const PRODUCT_COLUMNS: &str =
    "id, name, description, price, category, stock, image_url, created_at, updated_at";

type ProductRow = (
    i64,
    String,
    String,
    f64,
    String,
    i32,
    Option<String>,
    OffsetDateTime,
    OffsetDateTime,
);

fn from_row(row: ProductRow) -> Product {
    let (id, name, description, price, category, stock, image_url, created_at, updated_at) = row;
    Product {
        id,
        name,
        description,
        price,
        category,
        stock,
        image_url,
        created_at,
        updated_at,
    }
}

pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn create(
        &self,
        draft: &ProductDraft,
        image_url: Option<&str>,
    ) -> Result<Product, StorageError> {
        let sql = format!(
            "INSERT INTO products (name, description, price, category, stock, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PRODUCT_COLUMNS}"
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(&draft.category)
            .bind(draft.stock)
            .bind(image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(from_row(row))
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, StorageError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(from_row))
    }

    async fn update(&self, product: &Product) -> Result<Product, StorageError> {
        let sql = format!(
            "UPDATE products SET name = $1, description = $2, price = $3, category = $4, \
             stock = $5, image_url = $6, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $7 RETURNING {PRODUCT_COLUMNS}"
        );
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.category)
            .bind(product.stock)
            .bind(product.image_url.as_deref())
            .bind(product.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(from_row)
            .ok_or_else(|| StorageError::not_found("product", product.id))
    }

    async fn delete(&self, id: ProductId) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("product", id));
        }
        Ok(())
    }

    async fn list(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StorageError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::text IS NULL OR category = $1) \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn count(&self, category: Option<&str>) -> Result<i64, StorageError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM products WHERE ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(count)
    }

    async fn search(
        &self,
        query: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StorageError> {
        let pattern = format!("%{query}%");
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name ILIKE $1 OR description ILIKE $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn update_stock(&self, id: ProductId, stock: i32) -> Result<(), StorageError> {
        let result =
            sqlx::query("UPDATE products SET stock = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
                .bind(stock)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("product", id));
        }
        Ok(())
    }
}
