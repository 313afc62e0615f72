//! Order API Module
//!
//! 用户路由只能看到/操作自己的订单；管理员路由覆盖全部订单，
//! 状态变更会触发通知（见 [`crate::notify`]）。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/orders", user_routes())
        .nest("/api/admin/orders", admin_routes())
}

fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_mine))
        .route("/submit", post(handler::submit))
        .route("/{id}", get(handler::get_mine).delete(handler::remove_mine))
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::admin_list))
        .route("/{id}", get(handler::admin_get).delete(handler::admin_remove))
        .route("/{id}/status", put(handler::admin_update_status))
}
