use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::schema::CollectionSchema;

use super::{DocumentStore, Page, Properties, Query, RecordId, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Query { collection: String, params: String },
    Schema { collection: String },
}

impl CacheKey {
    fn collection(&self) -> &str {
        match self {
            CacheKey::Query { collection, .. } | CacheKey::Schema { collection } => collection,
        }
    }
}

#[derive(Clone)]
enum Cached {
    Page(Page),
    Schema(CollectionSchema),
}

struct CacheEntry {
    value: Cached,
    created_at: Instant,
}

/// Read-through cache in front of a [`DocumentStore`].
///
/// Query results are keyed by collection and query parameters, schemas by
/// collection, and every entry lives for a fixed TTL. Expired entries are
/// purged whenever a new one is stored. Writes pass straight
/// through and never invalidate; callers that need fresh reads after a
/// write call [`CachedStore::invalidate`] or use
/// [`CachedStore::query_fresh`]. A zero TTL disables caching.
pub struct CachedStore {
    inner: Arc<dyn DocumentStore>,
    ttl: Duration,
    entries: DashMap<CacheKey, CacheEntry>,
}

impl CachedStore {
    /// Wraps `inner` with a cache whose entries expire after `ttl`.
    pub fn new(inner: Arc<dyn DocumentStore>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
        }
    }

    /// The entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Runs `query` against the underlying store, skipping the cache.
    ///
    /// Keyed-upsert lookups use this so a record created moments ago is
    /// always found.
    pub fn query_fresh(&self, collection: &str, query: &Query) -> StoreResult<Page> {
        self.inner.query(collection, query)
    }

    /// Drops every cached query result and schema for `collection`.
    pub fn invalidate(&self, collection: &str) {
        self.entries.retain(|key, _| key.collection() != collection);
        debug!(collection = %collection, "Read cache invalidated");
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: &CacheKey) -> Option<Cached> {
        let entry = self.entries.get(key)?;
        if entry.created_at.elapsed() < self.ttl {
            return Some(entry.value.clone());
        }
        drop(entry);
        self.entries.remove(key);
        None
    }

    fn remember(&self, key: CacheKey, value: Cached) {
        if self.ttl.is_zero() {
            return;
        }
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.created_at.elapsed() < ttl);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );
    }
}

impl DocumentStore for CachedStore {
    fn query(&self, collection: &str, query: &Query) -> StoreResult<Page> {
        let Ok(params) = serde_json::to_string(query) else {
            return self.inner.query(collection, query);
        };
        let key = CacheKey::Query {
            collection: collection.to_string(),
            params,
        };
        if let Some(Cached::Page(page)) = self.lookup(&key) {
            return Ok(page);
        }
        let page = self.inner.query(collection, query)?;
        self.remember(key, Cached::Page(page.clone()));
        Ok(page)
    }

    fn create(&self, collection: &str, properties: Properties) -> StoreResult<RecordId> {
        self.inner.create(collection, properties)
    }

    fn update(&self, collection: &str, id: RecordId, properties: Properties) -> StoreResult<()> {
        self.inner.update(collection, id, properties)
    }

    fn schema(&self, collection: &str) -> StoreResult<CollectionSchema> {
        let key = CacheKey::Schema {
            collection: collection.to_string(),
        };
        if let Some(Cached::Schema(schema)) = self.lookup(&key) {
            return Ok(schema);
        }
        let schema = self.inner.schema(collection)?;
        self.remember(key, Cached::Schema(schema.clone()));
        Ok(schema)
    }
}
