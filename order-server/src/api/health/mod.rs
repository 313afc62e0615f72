//! Health API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Health router (public routes)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::welcome))
        .route("/api/health", get(handler::health))
}
