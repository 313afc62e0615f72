//! Notification Delivery
//!
//! 推送属于 best-effort：主写入已提交后才派发，失败只记日志，
//! 永远不会回滚或影响已提交的状态。
//!
//! - [`PushGateway`] - the external push service boundary
//! - [`NotificationService`] - persists notification records and dispatches
//!   pushes for order submission (admin fan-out) and status changes (owner)

pub mod push;

pub use push::{HttpPushGateway, NoopPushGateway};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;
use uuid::Uuid;

use shared::error::{AppError, AppResult};
use shared::models::Notification;
use shared::models::order::{Order, OrderStatus};
use shared::models::user::Admin;

use crate::store::{DocumentStore, collections};
use crate::utils::time::now_millis;

/// Push dispatch error. Logged, never surfaced to callers.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("push gateway rejected the message: {0}")]
    Rejected(String),

    #[error("push gateway unreachable: {0}")]
    Transport(String),
}

/// Push gateway boundary. Delivery is best-effort; the gateway may drop
/// messages silently.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: &Value,
    ) -> Result<(), PushError>;
}

/// Title and body for a status change. One fixed template per status.
pub fn status_message(status: OrderStatus, order_id: &str) -> (String, String) {
    let (title, detail) = match status {
        OrderStatus::Pending => ("Order received 📦", "we got it and will confirm it shortly"),
        OrderStatus::Confirmed => ("Order confirmed ✅", "it is queued for preparation"),
        OrderStatus::Preparing => ("Order in the kitchen 👩‍🍳", "it is being prepared right now"),
        OrderStatus::Ready => ("Order ready 🛍️", "it is packed and ready to go"),
        OrderStatus::OutForDelivery => ("Out for delivery 🛵", "it is on its way to you"),
        OrderStatus::Delivered => ("Delivered 🎉", "enjoy your meal"),
        OrderStatus::Cancelled => ("Order cancelled ❌", "it will not be processed"),
        OrderStatus::Returned => ("Order returned ↩️", "it has been marked as returned"),
    };
    (title.to_string(), format!("Your order {order_id}: {detail}."))
}

/// Persists notification records and dispatches push messages.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn DocumentStore>,
    push: Arc<dyn PushGateway>,
    /// Bounded admin fan-out; recipients beyond the cap are not notified.
    admin_fanout_limit: usize,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        push: Arc<dyn PushGateway>,
        admin_fanout_limit: usize,
    ) -> Self {
        Self {
            store,
            push,
            admin_fanout_limit,
        }
    }

    /// Admin fan-out for a newly submitted order.
    ///
    /// Every failure - recipient enumeration, a malformed admin record, a
    /// rejected push - is logged and swallowed; per-recipient outcomes are
    /// independent.
    pub async fn order_submitted(&self, order: &Order) {
        let admins = match self
            .store
            .query(collections::ADMINS, &[], Some(self.admin_fanout_limit))
            .await
        {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(order = %order.id, error = %e, "could not enumerate admin recipients");
                return;
            }
        };

        let title = format!("New order {} 🛎️", order.id);
        let body = format!(
            "{} item(s), total {}, deliver to {}",
            order.items.len(),
            order.total_amount,
            order.delivery_location
        );
        let data = json!({
            "orderId": order.id,
            "orderNumber": order.order_number,
        });

        for doc in admins {
            let admin: Admin = match serde_json::from_value(doc) {
                Ok(admin) => admin,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed admin record");
                    continue;
                }
            };
            let Some(token) = admin.device_token else {
                continue;
            };
            if let Err(e) = self.push.send(&token, &title, &body, &data).await {
                tracing::warn!(admin = %admin.id, order = %order.id, error = %e, "new-order push failed");
            }
        }
    }

    /// Record a status change for the order's owner and dispatch the push.
    ///
    /// The notification record is the committed part: its write failure is
    /// surfaced. The push itself runs detached and is error-swallowed.
    pub async fn status_changed(
        &self,
        order: &Order,
        acting_admin: &str,
    ) -> AppResult<Notification> {
        let (title, body) = status_message(order.status, &order.id);
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: order.user_id.clone(),
            title,
            body,
            order_id: order.id.clone(),
            status: order.status,
            is_read: false,
            created_at: now_millis(),
        };

        let doc =
            serde_json::to_value(&notification).map_err(|e| AppError::internal(e.to_string()))?;
        self.store
            .set(collections::NOTIFICATIONS, &notification.id, doc)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(
            order = %order.id,
            status = %order.status,
            admin = acting_admin,
            "order status changed"
        );

        let this = self.clone();
        let owner_order = order.clone();
        let (push_title, push_body) = (notification.title.clone(), notification.body.clone());
        tokio::spawn(async move {
            this.push_to_owner(&owner_order, &push_title, &push_body).await;
        });

        Ok(notification)
    }

    /// Push a status message to the order owner's device, if they have one.
    pub async fn push_to_owner(&self, order: &Order, title: &str, body: &str) {
        let user = match self.store.get(collections::USERS, &order.user_id).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::debug!(order = %order.id, user = %order.user_id, "owner has no profile, skipping push");
                return;
            }
            Err(e) => {
                tracing::warn!(order = %order.id, error = %e, "owner lookup failed, skipping push");
                return;
            }
        };

        let Some(token) = user.get("deviceToken").and_then(Value::as_str) else {
            return;
        };

        let data = json!({
            "orderId": order.id,
            "status": order.status.as_str(),
        });
        if let Err(e) = self.push.send(token, title, body, &data).await {
            tracing::warn!(order = %order.id, error = %e, "status push failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;

    /// Gateway stub that records sends, optionally failing them all.
    #[derive(Default)]
    struct RecordingPush {
        fail: bool,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl PushGateway for RecordingPush {
        async fn send(
            &self,
            device_token: &str,
            title: &str,
            body: &str,
            _data: &Value,
        ) -> Result<(), PushError> {
            self.sent
                .lock()
                .push((device_token.into(), title.into(), body.into()));
            if self.fail {
                return Err(PushError::Rejected("HTTP 500".into()));
            }
            Ok(())
        }
    }

    fn sample_order(status: OrderStatus) -> Order {
        Order {
            id: "ORD42".into(),
            order_number: 42,
            user_id: "user-1".into(),
            items: vec![],
            total_amount: Decimal::new(2500, 2),
            delivery_location: "Gate C".into(),
            status,
            created_at: 1_700_000_000_000,
            updated_at: None,
        }
    }

    async fn seed_owner(store: &MemoryStore, token: Option<&str>) {
        let mut doc = json!({
            "userId": "user-1",
            "email": "user@example.com",
            "createdAt": 0,
        });
        if let Some(token) = token {
            doc["deviceToken"] = Value::from(token);
        }
        store
            .set(collections::USERS, "user-1", doc)
            .await
            .unwrap();
    }

    #[test]
    fn test_every_status_has_an_emoji_template() {
        for status in OrderStatus::ALL {
            let (title, body) = status_message(status, "ORD42");
            assert!(
                title.chars().any(|c| !c.is_ascii()),
                "title for {status} must carry an emoji"
            );
            assert!(body.contains("ORD42"));
        }
    }

    #[test]
    fn test_templates_are_status_specific() {
        let mut titles: Vec<String> = OrderStatus::ALL
            .iter()
            .map(|s| status_message(*s, "ORD1").0)
            .collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), OrderStatus::ALL.len());
    }

    #[tokio::test]
    async fn test_status_change_persists_notification_even_when_push_fails() {
        let store = Arc::new(MemoryStore::new());
        seed_owner(&store, Some("tok-1")).await;
        let push = Arc::new(RecordingPush {
            fail: true,
            ..Default::default()
        });
        let service = NotificationService::new(store.clone(), push, 10);

        let order = sample_order(OrderStatus::Confirmed);
        let notification = service.status_changed(&order, "admin-1").await.unwrap();

        assert_eq!(notification.user_id, "user-1");
        assert_eq!(notification.status, OrderStatus::Confirmed);
        assert!(!notification.is_read);

        let stored = store
            .get(collections::NOTIFICATIONS, &notification.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["orderId"], "ORD42");
        assert_eq!(stored["status"], "CONFIRMED");
        assert_eq!(stored["isRead"], false);
    }

    #[tokio::test]
    async fn test_owner_push_uses_device_token() {
        let store = Arc::new(MemoryStore::new());
        seed_owner(&store, Some("tok-9")).await;
        let push = Arc::new(RecordingPush::default());
        let service = NotificationService::new(store.clone(), push.clone(), 10);

        let order = sample_order(OrderStatus::OutForDelivery);
        let (title, body) = status_message(order.status, &order.id);
        service.push_to_owner(&order, &title, &body).await;

        let sent = push.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "tok-9");
        assert!(sent[0].1.contains("Out for delivery"));
    }

    #[tokio::test]
    async fn test_owner_without_token_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        seed_owner(&store, None).await;
        let push = Arc::new(RecordingPush::default());
        let service = NotificationService::new(store.clone(), push.clone(), 10);

        let order = sample_order(OrderStatus::Ready);
        service.push_to_owner(&order, "t", "b").await;
        assert!(push.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_missing_owner_profile_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(RecordingPush::default());
        let service = NotificationService::new(store.clone(), push.clone(), 10);

        let order = sample_order(OrderStatus::Ready);
        service.push_to_owner(&order, "t", "b").await;
        assert!(push.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_admin_fanout_is_bounded() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..15 {
            store
                .set(
                    collections::ADMINS,
                    &format!("admin-{i}"),
                    json!({"id": format!("admin-{i}"), "deviceToken": format!("tok-{i}")}),
                )
                .await
                .unwrap();
        }
        let push = Arc::new(RecordingPush::default());
        let service = NotificationService::new(store.clone(), push.clone(), 10);

        service.order_submitted(&sample_order(OrderStatus::Pending)).await;
        assert_eq!(push.sent.lock().len(), 10);
    }

    #[tokio::test]
    async fn test_one_failing_recipient_does_not_stop_the_fanout() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..3 {
            store
                .set(
                    collections::ADMINS,
                    &format!("admin-{i}"),
                    json!({"id": format!("admin-{i}"), "deviceToken": format!("tok-{i}")}),
                )
                .await
                .unwrap();
        }
        // Every send fails; the loop must still visit all recipients.
        let push = Arc::new(RecordingPush {
            fail: true,
            ..Default::default()
        });
        let service = NotificationService::new(store.clone(), push.clone(), 10);

        service.order_submitted(&sample_order(OrderStatus::Pending)).await;
        assert_eq!(push.sent.lock().len(), 3);
    }
}
