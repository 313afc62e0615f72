//! Embedded in-memory document store
//!
//! Versioned documents over lock-free maps. Every committed write takes a
//! fresh value from a global commit stamp, so a deleted-and-recreated
//! document can never satisfy a stale read (no ABA window). Transactions
//! record the versions they read and stage their writes; the commit validates
//! the read set under the write lock and re-runs the body on conflict.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;

use super::{DocumentStore, Filter, StoreError, StoreResult, TransactionOps};

/// Conflicting transactions are re-run up to this many times before the
/// store reports [`StoreError::TransactionExhausted`].
const MAX_TRANSACTION_ATTEMPTS: u32 = 16;

#[derive(Debug, Clone)]
struct VersionedDoc {
    version: u64,
    data: Value,
}

/// Embedded document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, DashMap<String, VersionedDoc>>,
    /// Global commit stamp; document versions are drawn from it.
    stamp: AtomicU64,
    /// Serializes commits so read-set validation and write application are
    /// one atomic step.
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_stamp(&self) -> u64 {
        self.stamp.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current (version, data) for a document; version 0 means absent.
    fn snapshot(&self, collection: &str, id: &str) -> (u64, Option<Value>) {
        if let Some(coll) = self.collections.get(collection)
            && let Some(doc) = coll.get(id)
        {
            return (doc.version, Some(doc.data.clone()));
        }
        (0, None)
    }

    fn write_doc(&self, collection: &str, id: &str, data: Value) {
        let version = self.next_stamp();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), VersionedDoc { version, data });
    }

    /// Validate the read set and apply staged writes. Caller state is
    /// discarded on `false`; the transaction body runs again.
    fn try_commit(&self, txn: &MemoryTransaction<'_>) -> bool {
        let _guard = self.write_lock.lock();
        for read in &txn.reads {
            let (current, _) = self.snapshot(&read.collection, &read.id);
            if current != read.version {
                return false;
            }
        }
        for (collection, id, data) in &txn.writes {
            self.write_doc(collection, id, data.clone());
        }
        true
    }
}

#[derive(Debug)]
struct ReadRecord {
    collection: String,
    id: String,
    version: u64,
}

struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    reads: Vec<ReadRecord>,
    writes: Vec<(String, String, Value)>,
}

impl TransactionOps for MemoryTransaction<'_> {
    fn get(&mut self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        // Read-your-writes: a document staged in this transaction wins.
        if let Some((_, _, data)) = self
            .writes
            .iter()
            .rev()
            .find(|(c, i, _)| c == collection && i == id)
        {
            return Ok(Some(data.clone()));
        }

        let (version, data) = self.store.snapshot(collection, id);
        self.reads.push(ReadRecord {
            collection: collection.to_string(),
            id: id.to_string(),
            version,
        });
        Ok(data)
    }

    fn set(&mut self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
        self.writes
            .push((collection.to_string(), id.to_string(), data));
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let (_, data) = self.snapshot(collection, id);
        Ok(data)
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        self.write_doc(collection, id, data);
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::Serialization(
                "merge patch must be a JSON object".to_string(),
            ));
        };

        let _guard = self.write_lock.lock();
        let (_, existing) = self.snapshot(collection, id);
        let Some(existing) = existing else {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };

        let mut merged = match existing {
            Value::Object(map) => map,
            _ => {
                return Err(StoreError::Serialization(format!(
                    "document {collection}/{id} is not a JSON object"
                )));
            }
        };
        for (key, value) in patch {
            merged.insert(key, value);
        }
        self.write_doc(collection, id, Value::Object(merged));
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        if let Some(coll) = self.collections.get(collection) {
            coll.remove(id);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>> {
        let Some(coll) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut results = Vec::new();
        for entry in coll.iter() {
            let doc = &entry.value().data;
            let matches = filters
                .iter()
                .all(|f| doc.get(&f.field) == Some(&f.value));
            if matches {
                results.push(doc.clone());
                if let Some(limit) = limit
                    && results.len() >= limit
                {
                    break;
                }
            }
        }
        Ok(results)
    }

    async fn run_transaction(
        &self,
        body: &(dyn for<'t> Fn(&'t mut (dyn TransactionOps + 't)) -> StoreResult<Value>
              + Send
              + Sync),
    ) -> StoreResult<Value> {
        for _attempt in 0..MAX_TRANSACTION_ATTEMPTS {
            let mut txn = MemoryTransaction {
                store: self,
                reads: Vec::new(),
                writes: Vec::new(),
            };

            // A body error aborts the transaction outright; only version
            // conflicts are retried.
            let result = body(&mut txn)?;

            if self.try_commit(&txn) {
                return Ok(result);
            }

            // Let the competing writer finish before re-reading.
            tokio::task::yield_now().await;
        }
        Err(StoreError::TransactionExhausted(MAX_TRANSACTION_ATTEMPTS))
    }
}
