//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::error::{AppError, AppResult};
use shared::models::{Product, ProductCreate, ProductUpdate};

use crate::api::convert::{decode_document, decode_documents, store_error};
use crate::auth::AdminUser;
use crate::core::ServerState;
use crate::store::{Filter, collections};
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_LIST_LIMIT, MAX_NAME_LEN, MAX_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_positive_amount, validate_required_text,
};

/// Query params for the product listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Only active products by default.
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_active() -> bool {
    true
}

fn default_limit() -> usize {
    MAX_LIST_LIMIT
}

/// GET /api/products - public product listing
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let filters = if query.active {
        vec![Filter::eq("isActive", true)]
    } else {
        Vec::new()
    };
    let limit = query.limit.min(MAX_LIST_LIMIT);

    let docs = state
        .store
        .query(collections::PRODUCTS, &filters, Some(limit))
        .await
        .map_err(store_error)?;

    let mut products: Vec<Product> = decode_documents(docs);
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(products))
}

/// POST /api/products - create a product (admin)
pub async fn create(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<Product>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_positive_amount(payload.price, "price")?;
    validate_optional_text(&payload.image_url, "imageUrl", MAX_URL_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_TEXT_LEN)?;

    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        price: payload.price,
        category: payload.category,
        image_url: payload.image_url,
        description: payload.description.unwrap_or_default(),
        in_stock: payload.in_stock.unwrap_or(true),
        is_active: payload.is_active.unwrap_or(true),
        created_at: now_millis(),
    };

    let doc = serde_json::to_value(&product).map_err(|e| AppError::internal(e.to_string()))?;
    state
        .store
        .set(collections::PRODUCTS, &product.id, doc)
        .await
        .map_err(store_error)?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/{id} - partial update (admin)
pub async fn update(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_positive_amount(price, "price")?;
    }
    validate_optional_text(&payload.image_url, "imageUrl", MAX_URL_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_TEXT_LEN)?;

    // Existence check first so a missing product reads as 404, not as a
    // store-level merge failure.
    state
        .store
        .get(collections::PRODUCTS, &id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;

    // Only provided fields serialize, so the merge touches nothing else.
    let patch = serde_json::to_value(&payload).map_err(|e| AppError::internal(e.to_string()))?;
    state
        .store
        .merge(collections::PRODUCTS, &id, patch)
        .await
        .map_err(store_error)?;

    let doc = state
        .store
        .get(collections::PRODUCTS, &id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    Ok(Json(decode_document(doc)?))
}

/// DELETE /api/products/{id} - remove a product (admin)
pub async fn remove(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .store
        .get(collections::PRODUCTS, &id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;

    state
        .store
        .delete(collections::PRODUCTS, &id)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
