//! Admin catalog endpoints. All routes are behind the admin gate.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use furnish_catalog::ImageUpload;
use furnish_core::{Product, ProductDraft, ProductId};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let (draft, upload) = parse_product_form(multipart).await?;
    let product = state.catalog.create_product(draft, upload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let (draft, upload) = parse_product_form(multipart).await?;
    let product = state.catalog.update_product(id, draft, upload).await?;
    Ok(Json(product))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    pub stock: i32,
}

pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<StockUpdate>,
) -> Result<StatusCode, ApiError> {
    state.catalog.update_stock(id, body.stock).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Collects the product fields and the optional `image` file from a
/// multipart form.
async fn parse_product_form(
    mut multipart: Multipart,
) -> Result<(ProductDraft, Option<ImageUpload>), ApiError> {
    let mut name = None;
    let mut description = None;
    let mut price = None;
    let mut category = None;
    let mut stock = None;
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("malformed multipart body: {err}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = Some(text_field(field, "name").await?),
            "description" => description = Some(text_field(field, "description").await?),
            "price" => {
                let raw = text_field(field, "price").await?;
                price = Some(raw.parse::<f64>().map_err(|_| {
                    ApiError::bad_request(format!("price is not a number: {raw}"))
                })?);
            }
            "category" => category = Some(text_field(field, "category").await?),
            "stock" => {
                let raw = text_field(field, "stock").await?;
                stock = Some(raw.parse::<i32>().map_err(|_| {
                    ApiError::bad_request(format!("stock is not an integer: {raw}"))
                })?);
            }
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|err| {
                    ApiError::bad_request(format!("failed to read image field: {err}"))
                })?;
                if !data.is_empty() {
                    upload = Some(ImageUpload {
                        data,
                        filename,
                        content_type,
                    });
                }
            }
            _ => {}
        }
    }

    let draft = ProductDraft {
        name: required(name, "name")?,
        description: description.unwrap_or_default(),
        price: required(price, "price")?,
        category: required(category, "category")?,
        stock: stock.unwrap_or(0),
    };
    Ok((draft, upload))
}

async fn text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::bad_request(format!("failed to read field {name}: {err}")))
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(format!("missing required field: {name}")))
}
