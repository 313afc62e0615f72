//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查与欢迎页
//! - [`orders`] - 订单接口（用户 + 管理员）
//! - [`products`] - 商品管理接口
//! - [`categories`] - 分类管理接口（读路径带缓存）
//! - [`users`] - 用户资料接口
//! - [`analytics`] - 订单统计接口

pub mod convert;

pub mod analytics;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

// Re-export common types for handlers
pub use shared::error::AppResult;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(users::router())
        .merge(analytics::router())
}

/// Build the application with middleware applied
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - app and dashboard are served from other origins
        .layer(CorsLayer::permissive())
        // Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
}
