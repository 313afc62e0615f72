//! Document Store Boundary
//!
//! The service talks to its document database through [`DocumentStore`] and
//! never assumes anything beyond this surface: point reads/writes, shallow
//! merges, equality-filtered queries, and an atomic read-modify-write
//! transaction with optimistic conflict handling. The managed backend is an
//! external collaborator; [`MemoryStore`] is the embedded implementation the
//! server ships with.
//!
//! 计数器文档只允许通过 [`DocumentStore::run_transaction`] 修改，
//! 禁止 read-then-unconditional-write。

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Collection names used by the service.
pub mod collections {
    pub const COUNTERS: &str = "counters";
    pub const ORDERS: &str = "orders";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const ADMINS: &str = "admins";
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const CATEGORIES: &str = "categories";
}

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Transaction aborted after {0} conflicting attempts")]
    TransactionExhausted(u32),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Equality filter for [`DocumentStore::query`].
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Read/write operations available inside a transaction.
///
/// Reads record the observed document version; the commit is rejected and the
/// whole body re-run if any read document changed in the meantime. Writes are
/// staged and become visible only on commit (read-your-writes within the
/// same transaction).
pub trait TransactionOps: Send {
    fn get(&mut self, collection: &str, id: &str) -> StoreResult<Option<Value>>;
    fn set(&mut self, collection: &str, id: &str, data: Value) -> StoreResult<()>;
}

/// Document store interface.
///
/// Implementations must retry conflicting transactions transparently and
/// surface [`StoreError::TransactionExhausted`] once the retry budget is
/// spent - a conflict must never be reported as success.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read. `Ok(None)` when the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, data: Value) -> StoreResult<()>;

    /// Shallow-merge `patch` into an existing document.
    /// Fails with [`StoreError::NotFound`] when the document is absent.
    async fn merge(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()>;

    /// Delete a document. Deleting an absent document is a no-op.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Equality-filtered scan, optionally bounded. Result order is
    /// unspecified; callers sort when they need an order.
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>>;

    /// Run `body` as one atomic read-modify-write unit. The body may be
    /// invoked several times; it must be free of side effects outside the
    /// transaction handle.
    async fn run_transaction(
        &self,
        body: &(dyn for<'t> Fn(&'t mut (dyn TransactionOps + 't)) -> StoreResult<Value>
              + Send
              + Sync),
    ) -> StoreResult<Value>;
}
