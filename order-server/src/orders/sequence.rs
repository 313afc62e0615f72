//! Sequence Allocator
//!
//! 订单序号分配器。整个 read-increment-write 必须在存储事务内完成：
//! 事务外缓存或预读计数器会破坏唯一性保证。
//!
//! Under N concurrent callers on one counter the returned values are exactly
//! `{last+1, ..., last+N}` - no duplicates, no gaps. Conflict retries belong
//! to the store; this component only distinguishes "allocated" from
//! "allocation failed", and never fabricates a number.

use std::sync::Arc;

use serde_json::{Value, json};

use shared::error::{AppError, AppResult};

use crate::store::{DocumentStore, StoreError, TransactionOps, collections};

/// Counter used for order numbers.
pub const ORDER_COUNTER: &str = "orders";

/// Field holding the last committed value of a counter document.
const CURRENT_VALUE: &str = "currentValue";

/// Allocates strictly increasing, collision-free integers per counter name.
#[derive(Clone)]
pub struct SequenceAllocator {
    store: Arc<dyn DocumentStore>,
}

impl SequenceAllocator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Allocate the next value of `counter`.
    ///
    /// A missing counter document reads as 0, so the first allocation yields
    /// 1. Transaction exhaustion surfaces as [`AppError::Allocation`]; the
    /// caller must abort whatever needed the number.
    pub async fn allocate(&self, counter: &str) -> AppResult<i64> {
        let value = self
            .store
            .run_transaction(&|tx: &mut dyn TransactionOps| {
                let current = tx
                    .get(collections::COUNTERS, counter)?
                    .as_ref()
                    .and_then(|doc| doc.get(CURRENT_VALUE))
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                let next = current + 1;
                tx.set(collections::COUNTERS, counter, json!({ CURRENT_VALUE: next }))?;
                Ok(Value::from(next))
            })
            .await
            .map_err(|e| match e {
                StoreError::TransactionExhausted(_) => AppError::allocation(e.to_string()),
                other => AppError::database(other.to_string()),
            })?;

        value
            .as_i64()
            .ok_or_else(|| AppError::internal("counter transaction returned a non-integer value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Filter, MemoryStore, StoreResult};
    use async_trait::async_trait;

    #[tokio::test]
    async fn test_first_allocation_is_one() {
        let store = Arc::new(MemoryStore::new());
        let allocator = SequenceAllocator::new(store);
        assert_eq!(allocator.allocate(ORDER_COUNTER).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sequential_allocations_increment_by_one() {
        let store = Arc::new(MemoryStore::new());
        let allocator = SequenceAllocator::new(store.clone());
        for expected in 1..=5 {
            assert_eq!(allocator.allocate(ORDER_COUNTER).await.unwrap(), expected);
        }

        let doc = store
            .get(collections::COUNTERS, ORDER_COUNTER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc[CURRENT_VALUE], 5);
    }

    #[tokio::test]
    async fn test_counters_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let allocator = SequenceAllocator::new(store);
        assert_eq!(allocator.allocate("orders").await.unwrap(), 1);
        assert_eq!(allocator.allocate("invoices").await.unwrap(), 1);
        assert_eq!(allocator.allocate("orders").await.unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_allocations_from_41_yield_42_to_44() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(collections::COUNTERS, ORDER_COUNTER, json!({ CURRENT_VALUE: 41 }))
            .await
            .unwrap();

        let allocator = SequenceAllocator::new(store.clone());
        let mut handles = Vec::new();
        for _ in 0..3 {
            let allocator = allocator.clone();
            handles.push(tokio::spawn(async move {
                allocator.allocate(ORDER_COUNTER).await.unwrap()
            }));
        }

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }
        values.sort_unstable();
        assert_eq!(values, vec![42, 43, 44]);

        let doc = store
            .get(collections::COUNTERS, ORDER_COUNTER)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc[CURRENT_VALUE], 44);
    }

    /// Store stub whose transactions always exhaust their retry budget.
    struct ConflictedStore;

    #[async_trait]
    impl DocumentStore for ConflictedStore {
        async fn get(&self, _: &str, _: &str) -> StoreResult<Option<Value>> {
            Ok(None)
        }

        async fn set(&self, _: &str, _: &str, _: Value) -> StoreResult<()> {
            Ok(())
        }

        async fn merge(&self, _: &str, _: &str, _: Value) -> StoreResult<()> {
            Ok(())
        }

        async fn delete(&self, _: &str, _: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn query(
            &self,
            _: &str,
            _: &[Filter],
            _: Option<usize>,
        ) -> StoreResult<Vec<Value>> {
            Ok(Vec::new())
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
    async fn test_exhausted_transaction_surfaces_as_allocation_error() {
        let allocator = SequenceAllocator::new(Arc::new(ConflictedStore));
        let err = allocator.allocate(ORDER_COUNTER).await.unwrap_err();
        assert!(matches!(err, AppError::Allocation(_)));
    }
}
