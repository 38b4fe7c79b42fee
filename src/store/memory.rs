use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use crate::config::CollectionIds;
use crate::schema::{CollectionSchema, FieldValue, Scalar, canonical};

use super::{
    Direction, DocumentStore, Page, Properties, Query, Record, RecordId, StoreError, StoreResult,
};

struct Collection {
    schema: CollectionSchema,
    records: Vec<Record>,
}

/// A document store held in memory.
///
/// Collections must be registered with a schema before use; writes are
/// checked against it the way a hosted store rejects unknown properties.
/// Any collection can be marked unavailable to simulate transport failures.
pub struct InMemoryStore {
    collections: DashMap<String, Collection>,
    record_index: DashMap<RecordId, String>,
    unavailable: DashSet<String>,
    query_calls: AtomicUsize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a store with no collections.
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            record_index: DashMap::new(),
            unavailable: DashSet::new(),
            query_calls: AtomicUsize::new(0),
        }
    }

    /// Creates a store with every configured collection registered under
    /// its canonical schema.
    pub fn provisioned(ids: &CollectionIds) -> Self {
        let store = Self::new();
        let layouts = [
            (&ids.attendance, canonical::attendance()),
            (&ids.duty, canonical::duty()),
            (&ids.leave, canonical::leave()),
            (&ids.vacation, canonical::vacation()),
            (&ids.cashout_rule, canonical::cashout_rule()),
            (&ids.overtime_rule, canonical::overtime_rule()),
            (&ids.overtime_count, canonical::overtime_count()),
            (&ids.lunch, canonical::lunch()),
            (&ids.payroll, canonical::payroll()),
            (&ids.oplog, canonical::oplog()),
        ];
        for (id, schema) in layouts {
            if let Some(id) = id {
                store.register(id, schema);
            }
        }
        store
    }

    // ── Collections ──────────────────────────────────────────

    /// Registers `collection` with `schema`, replacing any previous schema
    /// and keeping existing records.
    pub fn register(&self, collection: &str, schema: CollectionSchema) {
        self.collections
            .entry(collection.to_string())
            .and_modify(|existing| existing.schema = schema.clone())
            .or_insert_with(|| Collection {
                schema,
                records: Vec::new(),
            });
    }

    /// Makes every call against `collection` fail with `Unavailable`.
    pub fn set_unavailable(&self, collection: &str) {
        self.unavailable.insert(collection.to_string());
    }

    /// Undoes [`InMemoryStore::set_unavailable`].
    pub fn set_available(&self, collection: &str) {
        self.unavailable.remove(collection);
    }

    // ── Inspection ───────────────────────────────────────────

    /// All records of `collection` in insertion order.
    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.collections
            .get(collection)
            .map(|c| c.records.clone())
            .unwrap_or_default()
    }

    /// Number of records in `collection`.
    pub fn record_count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map_or(0, |c| c.records.len())
    }

    /// Number of `query` calls served so far.
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::Relaxed)
    }

    fn check_available(&self, collection: &str) -> StoreResult<()> {
        if self.unavailable.contains(collection) || !self.collections.contains_key(collection) {
            return Err(StoreError::Unavailable {
                collection: collection.to_string(),
            });
        }
        Ok(())
    }
}

fn validate(schema: &CollectionSchema, properties: &Properties) -> StoreResult<()> {
    for (key, value) in properties {
        let field = schema.field(key).ok_or_else(|| StoreError::Rejected {
            message: format!("unknown property '{key}'"),
        })?;
        if field.kind != value.kind() {
            return Err(StoreError::Rejected {
                message: format!(
                    "property '{key}' is {:?}, got {:?}",
                    field.kind,
                    value.kind()
                ),
            });
        }
        if let FieldValue::Select(Some(name)) = value {
            if !field.options.is_empty() && !field.options.contains(name) {
                return Err(StoreError::Rejected {
                    message: format!("'{name}' is not an option of '{key}'"),
                });
            }
        }
    }
    Ok(())
}

fn sort_value(record: &Record, field: &str) -> Scalar {
    record
        .properties
        .get(field)
        .map_or(Scalar::Empty, FieldValue::decode)
}

impl DocumentStore for InMemoryStore {
    fn query(&self, collection: &str, query: &Query) -> StoreResult<Page> {
        self.query_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available(collection)?;

        let mut matched: Vec<Record> = self
            .collections
            .get(collection)
            .map(|c| {
                c.records
                    .iter()
                    .filter(|record| query.filter.as_ref().is_none_or(|f| f.matches(record)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| {
                let ordering = sort_value(a, &sort.field).compare(&sort_value(b, &sort.field));
                match sort.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        let offset = match &query.cursor {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| StoreError::Rejected {
                message: format!("invalid cursor '{cursor}'"),
            })?,
            None => 0,
        };
        let page_size = query.page_size.max(1);
        let end = offset.saturating_add(page_size).min(matched.len());
        let has_more = end < matched.len();
        let records = matched
            .into_iter()
            .skip(offset)
            .take(end.saturating_sub(offset))
            .collect();

        Ok(Page {
            records,
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }

    fn create(&self, collection: &str, properties: Properties) -> StoreResult<RecordId> {
        self.check_available(collection)?;
        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::Unavailable {
                collection: collection.to_string(),
            })?;
        validate(&entry.schema, &properties)?;

        let id = Uuid::new_v4();
        entry.records.push(Record { id, properties });
        drop(entry);
        self.record_index.insert(id, collection.to_string());
        Ok(id)
    }

    fn update(&self, collection: &str, id: RecordId, properties: Properties) -> StoreResult<()> {
        self.check_available(collection)?;
        let owner = self.record_index.get(&id).map(|e| e.value().clone());
        if owner.as_deref() != Some(collection) {
            return Err(StoreError::RecordNotFound { id });
        }

        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or(StoreError::RecordNotFound { id })?;
        validate(&entry.schema, &properties)?;
        let record = entry
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(StoreError::RecordNotFound { id })?;
        record.properties.extend(properties);
        Ok(())
    }

    fn schema(&self, collection: &str) -> StoreResult<CollectionSchema> {
        self.check_available(collection)?;
        self.collections
            .get(collection)
            .map(|c| c.schema.clone())
            .ok_or_else(|| StoreError::Unavailable {
                collection: collection.to_string(),
            })
    }
}
