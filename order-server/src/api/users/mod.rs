//! User API Module
//!
//! Profile creation is public (it happens right after sign-up, before the
//! client has exercised its token); profile reads are self-only.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// User router
pub fn router() -> Router<ServerState> {
    Router::new()
        .nest(
            "/api/users",
            Router::new()
                .route("/", post(handler::create))
                .route("/{id}", get(handler::get_profile)),
        )
        .route("/api/admin/users", get(handler::admin_list))
}
