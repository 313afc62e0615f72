//! Order Model
//!
//! 订单主表模型。`order_number` 由计数器事务分配，全局唯一且严格递增；
//! 文档 ID 由序号推导 (`ORD{n}`)，因此同样唯一。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Document id prefix for orders. `ORD{order_number}`.
pub const ORDER_ID_PREFIX: &str = "ORD";

// =============================================================================
// Order Status
// =============================================================================

/// Order lifecycle status.
///
/// Any status may follow any other; the backend does not restrict the
/// transition graph (see `status_transitions_are_unrestricted` test).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    /// Wire representation (SCREAMING_SNAKE_CASE).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "OUT_FOR_DELIVERY" => Ok(Self::OutForDelivery),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            "RETURNED" => Ok(Self::Returned),
            _ => Err(format!("unknown order status: {s}")),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A single line item on an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    /// Unit price, must be positive.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Must be a positive integer.
    pub quantity: i32,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Document id, `ORD{order_number}`.
    pub id: String,
    /// Sequential human-facing number, unique per counter.
    pub order_number: i64,
    /// Owner, taken from the verified caller identity, never from the payload.
    pub user_id: String,
    pub items: Vec<OrderItem>,
    /// Expected to equal the sum of line items; not enforced.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub delivery_location: String,
    pub status: OrderStatus,
    /// Unix millis
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Order {
    /// Derive the document id for an order number.
    pub fn id_for_number(number: i64) -> String {
        format!("{ORDER_ID_PREFIX}{number}")
    }
}

// =============================================================================
// Requests / Responses
// =============================================================================

/// Client payload for order submission. The owning user never comes from
/// here; it is the verified caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmit {
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub delivery_location: Option<String>,
}

/// Response body for a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    pub order_number: i64,
}

/// Status update request. The status arrives as a raw token so an unknown
/// value surfaces as a validation error rather than a body-decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_wire_format_is_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"OUT_FOR_DELIVERY\"");
    }

    #[test]
    fn test_status_from_str_round_trips() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn test_status_from_str_rejects_unknown() {
        assert!(OrderStatus::from_str("SHIPPED").is_err());
        assert!(OrderStatus::from_str("pending").is_err());
        assert!(OrderStatus::from_str("").is_err());
    }

    #[test]
    fn test_order_id_derived_from_number() {
        assert_eq!(Order::id_for_number(42), "ORD42");
    }

    #[test]
    fn test_order_serializes_camel_case() {
        let order = Order {
            id: "ORD1".into(),
            order_number: 1,
            user_id: "user-1".into(),
            items: vec![OrderItem {
                name: "Pad Thai".into(),
                price: Decimal::new(1250, 2),
                quantity: 2,
            }],
            total_amount: Decimal::new(2500, 2),
            delivery_location: "Dorm B, Room 12".into(),
            status: OrderStatus::Pending,
            created_at: 1_700_000_000_000,
            updated_at: None,
        };
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["orderNumber"], 1);
        assert_eq!(value["userId"], "user-1");
        assert_eq!(value["totalAmount"], 25.0);
        assert_eq!(value["status"], "PENDING");
        assert!(value.get("updatedAt").is_none());
    }
}
