//! Catalog Service - category list with in-memory caching
//!
//! The category list is read-mostly (every app launch fetches it, admins
//! touch it rarely), so reads are served from a TTL snapshot. Every category
//! mutation calls [`CatalogService::invalidate`]; orders and other documents
//! are never cached anywhere.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use shared::error::{AppError, AppResult};
use shared::models::Category;

use crate::store::{DocumentStore, Filter, collections};

struct CachedList {
    fetched_at: Instant,
    items: Vec<Category>,
}

/// Category read path with snapshot caching.
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    ttl: Duration,
    cached: RwLock<Option<CachedList>>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Active categories sorted by sort order, served from cache within the
    /// TTL.
    pub async fn categories(&self) -> AppResult<Vec<Category>> {
        {
            let guard = self.cached.read();
            if let Some(cached) = guard.as_ref()
                && cached.fetched_at.elapsed() < self.ttl
            {
                return Ok(cached.items.clone());
            }
        }

        let docs = self
            .store
            .query(collections::CATEGORIES, &[Filter::eq("isActive", true)], None)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let mut items = Vec::with_capacity(docs.len());
        for doc in docs {
            match serde_json::from_value::<Category>(doc) {
                Ok(category) => items.push(category),
                Err(e) => tracing::warn!(error = %e, "skipping malformed category record"),
            }
        }
        items.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));

        *self.cached.write() = Some(CachedList {
            fetched_at: Instant::now(),
            items: items.clone(),
        });
        Ok(items)
    }

    /// Drop the snapshot; the next read goes back to the store.
    pub fn invalidate(&self) {
        *self.cached.write() = None;
    }
}
