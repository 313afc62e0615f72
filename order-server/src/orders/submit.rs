//! Order Submission Orchestrator
//!
//! submit 协议（顺序不可调换）：
//! 1. 校验 payload，任何违规在写入前失败
//! 2. 计数器事务分配序号
//! 3. 以 `ORD{n}` 为文档 ID 持久化订单（状态 PENDING，归属为已验证的调用者）
//! 4. 管理员通知 fan-out，detached，失败只记日志
//!
//! The order write always precedes notification dispatch, so a crash between
//! the two leaves an "exists but un-notified" order and never the reverse.

use std::sync::Arc;

use rust_decimal::Decimal;

use shared::error::{AppError, AppResult};
use shared::models::order::{Order, OrderReceipt, OrderStatus, OrderSubmit};

use crate::notify::NotificationService;
use crate::orders::sequence::{ORDER_COUNTER, SequenceAllocator};
use crate::store::{DocumentStore, collections};
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_required_text};

/// Order submission service.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
    allocator: SequenceAllocator,
    notifier: NotificationService,
}

impl OrderService {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: NotificationService) -> Self {
        let allocator = SequenceAllocator::new(store.clone());
        Self {
            store,
            allocator,
            notifier,
        }
    }

    /// Submit an order for the verified caller.
    ///
    /// Either fully succeeds (order exists with a unique sequential number)
    /// or fully fails with nothing written. Notification outcome never
    /// affects the result.
    pub async fn submit(&self, user_id: &str, payload: OrderSubmit) -> AppResult<OrderReceipt> {
        let delivery_location = validate_submission(&payload)?;

        let order_number = self.allocator.allocate(ORDER_COUNTER).await?;

        let order = Order {
            id: Order::id_for_number(order_number),
            order_number,
            user_id: user_id.to_string(),
            items: payload.items,
            total_amount: payload.total_amount,
            delivery_location,
            status: OrderStatus::Pending,
            created_at: now_millis(),
            updated_at: None,
        };

        let doc = serde_json::to_value(&order).map_err(|e| AppError::internal(e.to_string()))?;
        self.store
            .set(collections::ORDERS, &order.id, doc)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(
            order = %order.id,
            user = %order.user_id,
            total = %order.total_amount,
            "order submitted"
        );

        // The order is durable; admin fan-out runs detached and swallows
        // its own failures.
        let notifier = self.notifier.clone();
        let submitted = order.clone();
        tokio::spawn(async move {
            notifier.order_submitted(&submitted).await;
        });

        Ok(OrderReceipt {
            order_id: order.id,
            order_number,
        })
    }
}

/// Validate a submission payload. Returns the trimmed delivery location.
fn validate_submission(payload: &OrderSubmit) -> AppResult<String> {
    if payload.items.is_empty() {
        return Err(AppError::validation("order must contain at least one item"));
    }

    for (index, item) in payload.items.iter().enumerate() {
        validate_required_text(&item.name, &format!("item {index} name"), MAX_NAME_LEN)?;
        if item.price <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "item {index}: price must be positive"
            )));
        }
        if item.quantity <= 0 {
            return Err(AppError::validation(format!(
                "item {index}: quantity must be a positive integer"
            )));
        }
    }

    if payload.total_amount <= Decimal::ZERO {
        return Err(AppError::validation("totalAmount must be positive"));
    }

    let location = payload
        .delivery_location
        .as_deref()
        .unwrap_or_default()
        .trim();
    if location.is_empty() {
        return Err(AppError::validation("deliveryLocation is required"));
    }
    if location.len() > MAX_ADDRESS_LEN {
        return Err(AppError::validation(format!(
            "deliveryLocation is too long ({} chars, max {MAX_ADDRESS_LEN})",
            location.len()
        )));
    }

    Ok(location.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::push::NoopPushGateway;
    use crate::store::{Filter, MemoryStore, StoreError, StoreResult, TransactionOps};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use shared::models::order::OrderItem;

    fn service_over(store: Arc<dyn DocumentStore>) -> OrderService {
        let notifier = NotificationService::new(store.clone(), Arc::new(NoopPushGateway), 10);
        OrderService::new(store, notifier)
    }

    fn payload(items: Vec<OrderItem>, total: Decimal) -> OrderSubmit {
        OrderSubmit {
            items,
            total_amount: total,
            delivery_location: Some("Building 4, desk 12".to_string()),
        }
    }

    fn item(price: i64, quantity: i32) -> OrderItem {
        OrderItem {
            name: "Green curry".to_string(),
            price: Decimal::new(price, 2),
            quantity,
        }
    }

    async fn order_count(store: &MemoryStore) -> usize {
        store
            .query(collections::ORDERS, &[], None)
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_submit_creates_pending_order_with_sequential_id() {
        let store = Arc::new(MemoryStore::new());
        let service = service_over(store.clone());

        let receipt = service
            .submit("user-7", payload(vec![item(1250, 2)], Decimal::new(2500, 2)))
            .await
            .unwrap();

        assert_eq!(receipt.order_id, "ORD1");
        assert_eq!(receipt.order_number, 1);

        let doc = store
            .get(collections::ORDERS, "ORD1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["status"], "PENDING");
        assert_eq!(doc["userId"], "user-7");
        assert_eq!(doc["orderNumber"], 1);
    }

    #[tokio::test]
    async fn test_owner_comes_from_caller_not_payload() {
        // OrderSubmit carries no user field at all; the caller id is the
        // only possible owner.
        let store = Arc::new(MemoryStore::new());
        let service = service_over(store.clone());
        service
            .submit("verified-user", payload(vec![item(500, 1)], Decimal::new(500, 2)))
            .await
            .unwrap();

        let doc = store
            .get(collections::ORDERS, "ORD1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["userId"], "verified-user");
    }

    #[tokio::test]
    async fn test_zero_price_item_rejected_without_writes() {
        let store = Arc::new(MemoryStore::new());
        let service = service_over(store.clone());

        let err = service
            .submit("user-1", payload(vec![item(0, 1)], Decimal::ZERO))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(order_count(&store).await, 0);
        assert!(
            store
                .get(collections::COUNTERS, ORDER_COUNTER)
                .await
                .unwrap()
                .is_none(),
            "validation failures must not touch the counter"
        );
    }

    #[tokio::test]
    async fn test_empty_items_rejected() {
        let store = Arc::new(MemoryStore::new());
        let service = service_over(store.clone());
        let err = service
            .submit("user-1", payload(vec![], Decimal::new(100, 2)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(order_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected() {
        let store = Arc::new(MemoryStore::new());
        let service = service_over(store.clone());
        let err = service
            .submit("user-1", payload(vec![item(500, -2)], Decimal::new(500, 2)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(order_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_missing_delivery_location_rejected() {
        let store = Arc::new(MemoryStore::new());
        let service = service_over(store.clone());
        let mut p = payload(vec![item(500, 1)], Decimal::new(500, 2));
        p.delivery_location = Some("   ".to_string());
        let err = service.submit("user-1", p).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(order_count(&store).await, 0);
    }

    #[tokio::test]
    async fn test_total_not_matching_items_is_accepted() {
        // Expected to equal the item sum but deliberately not enforced.
        let store = Arc::new(MemoryStore::new());
        let service = service_over(store.clone());
        let receipt = service
            .submit("user-1", payload(vec![item(500, 1)], Decimal::new(99_00, 2)))
            .await
            .unwrap();
        assert_eq!(receipt.order_number, 1);
    }

    #[tokio::test]
    async fn test_consecutive_submissions_get_consecutive_numbers() {
        let store = Arc::new(MemoryStore::new());
        let service = service_over(store.clone());
        for expected in 1..=3 {
            let receipt = service
                .submit("user-1", payload(vec![item(500, 1)], Decimal::new(500, 2)))
                .await
                .unwrap();
            assert_eq!(receipt.order_number, expected);
            assert_eq!(receipt.order_id, format!("ORD{expected}"));
        }
        assert_eq!(order_count(&store).await, 3);
    }

    /// Store whose transactions fail but whose plain writes work, to prove
    /// no order document appears when allocation fails.
    struct AllocationOutage {
        inner: MemoryStore,
    }

    #[async_trait]
    impl DocumentStore for AllocationOutage {
        async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
            self.inner.get(collection, id).await
        }

        async fn set(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
            self.inner.set(collection, id, data).await
        }

        async fn merge(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
            self.inner.merge(collection, id, patch).await
        }

        async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
            self.inner.delete(collection, id).await
        }

        async fn query(
            &self,
            collection: &str,
            filters: &[Filter],
            limit: Option<usize>,
        ) -> StoreResult<Vec<Value>> {
            self.inner.query(collection, filters, limit).await
        }

        async fn run_transaction(
            &self,
            _: &(dyn for<'t> Fn(&'t mut (dyn TransactionOps + 't)) -> StoreResult<Value>
               + Send
               + Sync),
        ) -> StoreResult<Value> {
            Err(StoreError::TransactionExhausted(5))
        }
    }

    #[tokio::test]
    async fn test_allocation_failure_creates_no_order() {
        let store = Arc::new(AllocationOutage {
            inner: MemoryStore::new(),
        });
        let service = service_over(store.clone());

        let err = service
            .submit("user-1", payload(vec![item(500, 1)], Decimal::new(500, 2)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Allocation(_)));
        let orders = store
            .query(collections::ORDERS, &[], None)
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_validate_returns_trimmed_location() {
        let p = OrderSubmit {
            items: vec![item(500, 1)],
            total_amount: Decimal::new(500, 2),
            delivery_location: Some("  Gate C  ".to_string()),
        };
        assert_eq!(validate_submission(&p).unwrap(), "Gate C");
    }

    #[tokio::test]
    async fn test_admins_receive_fanout_after_submit() {
        use crate::notify::PushGateway;
        use parking_lot::Mutex;

        #[derive(Default)]
        struct Recording {
            sent: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl PushGateway for Recording {
            async fn send(
                &self,
                device_token: &str,
                _title: &str,
                _body: &str,
                _data: &Value,
            ) -> Result<(), crate::notify::PushError> {
                self.sent.lock().push(device_token.to_string());
                Ok(())
            }
        }

        let store = Arc::new(MemoryStore::new());
        store
            .set(
                collections::ADMINS,
                "admin-1",
                json!({"id": "admin-1", "deviceToken": "tok-1"}),
            )
            .await
            .unwrap();
        store
            .set(collections::ADMINS, "admin-2", json!({"id": "admin-2"}))
            .await
            .unwrap();

        let push = Arc::new(Recording::default());
        let notifier = NotificationService::new(store.clone(), push.clone(), 10);
        let service = OrderService::new(store.clone(), notifier.clone());

        let receipt = service
            .submit("user-1", payload(vec![item(500, 1)], Decimal::new(500, 2)))
            .await
            .unwrap();

        // Drive the fan-out directly instead of racing the detached task.
        let doc = store
            .get(collections::ORDERS, &receipt.order_id)
            .await
            .unwrap()
            .unwrap();
        let order: Order = serde_json::from_value(doc).unwrap();
        notifier.order_submitted(&order).await;

        let sent = push.sent.lock();
        assert!(sent.contains(&"tok-1".to_string()));
        // admin-2 has no device token and is skipped.
        assert!(sent.iter().all(|t| t == "tok-1"));
    }
}
