//! Analytics API Handlers
//!
//! Aggregations are computed over the order collection on each request; the
//! volumes involved (single user, bounded shop) do not justify materialized
//! counters.

use std::collections::HashMap;

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;

use shared::error::AppResult;
use shared::models::order::Order;

use crate::api::convert::{decode_documents, store_error};
use crate::auth::{AdminUser, CurrentUser};
use crate::core::ServerState;
use crate::store::{Filter, collections};

/// Order statistics
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalytics {
    pub total_orders: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
    pub status_counts: HashMap<String, u64>,
}

fn summarize(orders: &[Order]) -> OrderAnalytics {
    let mut status_counts: HashMap<String, u64> = HashMap::new();
    let mut total_revenue = Decimal::ZERO;
    for order in orders {
        total_revenue += order.total_amount;
        *status_counts.entry(order.status.to_string()).or_insert(0) += 1;
    }
    OrderAnalytics {
        total_orders: orders.len(),
        total_revenue,
        status_counts,
    }
}

/// GET /api/analytics/orders - the caller's order statistics
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<OrderAnalytics>> {
    let docs = state
        .store
        .query(
            collections::ORDERS,
            &[Filter::eq("userId", user.user_id.as_str())],
            None,
        )
        .await
        .map_err(store_error)?;
    let orders: Vec<Order> = decode_documents(docs);
    Ok(Json(summarize(&orders)))
}

/// GET /api/admin/analytics - store-wide order statistics
pub async fn overview(
    State(state): State<ServerState>,
    _admin: AdminUser,
) -> AppResult<Json<OrderAnalytics>> {
    let docs = state
        .store
        .query(collections::ORDERS, &[], None)
        .await
        .map_err(store_error)?;
    let orders: Vec<Order> = decode_documents(docs);
    Ok(Json(summarize(&orders)))
}
