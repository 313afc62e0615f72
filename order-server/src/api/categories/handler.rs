//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use shared::error::{AppError, AppResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};

use crate::api::convert::{decode_document, store_error};
use crate::auth::AdminUser;
use crate::core::ServerState;
use crate::store::collections;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};

/// GET /api/categories - cached category listing
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.catalog.categories().await?;
    Ok(Json(categories))
}

/// POST /api/categories - create a category (admin)
pub async fn create(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let category = Category {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        sort_order: payload.sort_order.unwrap_or(0),
        is_active: payload.is_active.unwrap_or(true),
    };

    let doc = serde_json::to_value(&category).map_err(|e| AppError::internal(e.to_string()))?;
    state
        .store
        .set(collections::CATEGORIES, &category.id, doc)
        .await
        .map_err(store_error)?;
    state.catalog.invalidate();

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id} - partial update (admin)
pub async fn update(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }

    state
        .store
        .get(collections::CATEGORIES, &id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("Category {id}")))?;

    let patch = serde_json::to_value(&payload).map_err(|e| AppError::internal(e.to_string()))?;
    state
        .store
        .merge(collections::CATEGORIES, &id, patch)
        .await
        .map_err(store_error)?;
    state.catalog.invalidate();

    let doc = state
        .store
        .get(collections::CATEGORIES, &id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("Category {id}")))?;
    Ok(Json(decode_document(doc)?))
}

/// DELETE /api/categories/{id} - remove a category (admin)
pub async fn remove(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .store
        .get(collections::CATEGORIES, &id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("Category {id}")))?;

    state
        .store
        .delete(collections::CATEGORIES, &id)
        .await
        .map_err(store_error)?;
    state.catalog.invalidate();

    Ok(StatusCode::NO_CONTENT)
}
