//! Notification Model
//!
//! Append-only. Created once per status change; the read/unread toggle
//! belongs to the client-facing CRUD layer, not to this service.

use serde::{Deserialize, Serialize};

use super::order::OrderStatus;

/// Notification entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    /// Recipient (the order's owner).
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub is_read: bool,
    /// Unix millis
    pub created_at: i64,
}
