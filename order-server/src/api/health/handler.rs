//! Health API Handlers

use axum::Json;
use serde_json::{Value, json};

use crate::utils::time::now_rfc3339;

/// GET / - service welcome page
pub async fn welcome() -> Json<Value> {
    Json(json!({
        "name": "Krill Order Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/api/health",
            "orders": "/api/orders",
            "orderSubmit": "/api/orders/submit",
            "products": "/api/products",
            "categories": "/api/categories",
            "users": "/api/users",
            "analytics": "/api/analytics/orders",
            "admin": "/api/admin/*",
        },
    }))
}

/// GET /api/health - liveness check
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": now_rfc3339(),
    }))
}
