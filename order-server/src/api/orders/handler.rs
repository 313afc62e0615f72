//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use shared::error::{AppError, AppResult};
use shared::models::order::{Order, OrderReceipt, OrderStatus, OrderSubmit, StatusUpdate};

use crate::api::convert::{decode_document, decode_documents, store_error};
use crate::auth::{AdminUser, CurrentUser};
use crate::core::ServerState;
use crate::store::{Filter, collections};
use crate::utils::time::now_millis;
use crate::utils::validation::MAX_LIST_LIMIT;

async fn load_order(state: &ServerState, id: &str) -> AppResult<Order> {
    let doc = state
        .store
        .get(collections::ORDERS, id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::not_found(format!("Order {id}")))?;
    decode_document(doc)
}

// =============================================================================
// User routes
// =============================================================================

/// GET /api/orders - the caller's orders, newest first
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let docs = state
        .store
        .query(
            collections::ORDERS,
            &[Filter::eq("userId", user.user_id.as_str())],
            None,
        )
        .await
        .map_err(store_error)?;

    let mut orders: Vec<Order> = decode_documents(docs);
    orders.sort_by_key(|o| std::cmp::Reverse(o.order_number));
    Ok(Json(orders))
}

/// POST /api/orders/submit - validate, allocate a sequential number, persist
pub async fn submit(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderSubmit>,
) -> AppResult<(StatusCode, Json<OrderReceipt>)> {
    let receipt = state.orders.submit(&user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /api/orders/{id} - one of the caller's orders
///
/// Someone else's order id reads as not-found, not as forbidden.
pub async fn get_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = load_order(&state, &id).await?;
    if order.user_id != user.user_id {
        return Err(AppError::not_found(format!("Order {id}")));
    }
    Ok(Json(order))
}

/// DELETE /api/orders/{id} - remove one of the caller's orders
pub async fn remove_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let order = load_order(&state, &id).await?;
    if order.user_id != user.user_id {
        return Err(AppError::not_found(format!("Order {id}")));
    }
    state
        .store
        .delete(collections::ORDERS, &id)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Admin routes
// =============================================================================

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// GET /api/admin/orders - all orders (bounded), newest first
pub async fn admin_list(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let limit = query.limit.min(MAX_LIST_LIMIT);
    let docs = state
        .store
        .query(collections::ORDERS, &[], Some(limit))
        .await
        .map_err(store_error)?;

    let mut orders: Vec<Order> = decode_documents(docs);
    orders.sort_by_key(|o| std::cmp::Reverse(o.order_number));
    Ok(Json(orders))
}

/// GET /api/admin/orders/{id}
pub async fn admin_get(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = load_order(&state, &id).await?;
    Ok(Json(order))
}

/// PUT /api/admin/orders/{id}/status - transition an order
///
/// The status write commits first; then the owner's notification record is
/// persisted and the push dispatched. Push outcome never rolls anything
/// back.
pub async fn admin_update_status(
    State(state): State<ServerState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<Order>> {
    let status: OrderStatus = payload
        .status
        .parse()
        .map_err(|e: String| AppError::validation(e))?;

    let mut order = load_order(&state, &id).await?;
    order.status = status;
    order.updated_at = Some(now_millis());

    state
        .store
        .merge(
            collections::ORDERS,
            &id,
            json!({
                "status": status.as_str(),
                "updatedAt": order.updated_at,
            }),
        )
        .await
        .map_err(store_error)?;

    state.notifier.status_changed(&order, &admin.admin_id).await?;

    Ok(Json(order))
}

/// DELETE /api/admin/orders/{id}
pub async fn admin_remove(
    State(state): State<ServerState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    load_order(&state, &id).await?;
    state
        .store
        .delete(collections::ORDERS, &id)
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}
