//! Document store contract.
//!
//! The engine talks to an external document store holding one collection per
//! entity. This module defines the narrow interface the engine needs
//! (query, create, update, schema), an in-memory implementation and a TTL
//! read cache that fronts any implementation.

mod cache;
mod memory;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::schema::{CollectionSchema, FieldValue, Scalar};

pub use cache::CachedStore;
pub use memory::InMemoryStore;

/// Identifier of a stored record.
pub type RecordId = Uuid;

/// Property values keyed by actual field name.
pub type Properties = BTreeMap<String, FieldValue>;

/// A record as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The record's id.
    pub id: RecordId,
    /// Property values keyed by actual field name.
    pub properties: Properties,
}

/// Errors reported by a document store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The collection does not exist or cannot be reached.
    #[error("Collection '{collection}' is unavailable")]
    Unavailable {
        /// The collection id.
        collection: String,
    },

    /// No record has the given id.
    #[error("Record not found: {id}")]
    RecordNotFound {
        /// The missing record id.
        id: RecordId,
    },

    /// The store refused the request.
    #[error("Request rejected: {message}")]
    Rejected {
        /// Why the request was refused.
        message: String,
    },
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// A query filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// The field equals the value (text-like, number or select).
    Equals {
        /// Actual field key.
        field: String,
        /// The value to compare with.
        value: Scalar,
    },
    /// The field's date is on or after `date`.
    OnOrAfter {
        /// Actual field key.
        field: String,
        /// Inclusive lower bound.
        date: NaiveDate,
    },
    /// The field's date is before `date`.
    Before {
        /// Actual field key.
        field: String,
        /// Exclusive upper bound.
        date: NaiveDate,
    },
    /// The multi-select field contains `value`.
    Contains {
        /// Actual field key.
        field: String,
        /// The option to look for.
        value: String,
    },
    /// Every filter matches.
    And(Vec<Filter>),
    /// At least one filter matches.
    Or(Vec<Filter>),
}

impl Filter {
    /// Equality on `field`.
    pub fn equals(field: &str, value: impl Into<Scalar>) -> Self {
        Filter::Equals {
            field: field.to_string(),
            value: value.into(),
        }
    }

    /// Half-open date range `[start, end)` on `field`.
    pub fn date_range(field: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Filter::And(vec![
            Filter::OnOrAfter {
                field: field.to_string(),
                date: start,
            },
            Filter::Before {
                field: field.to_string(),
                date: end,
            },
        ])
    }

    /// Combines filters with AND, flattening the trivial cases.
    pub fn all(mut filters: Vec<Filter>) -> Option<Self> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::And(filters)),
        }
    }

    /// Evaluates the filter against `record`.
    pub fn matches(&self, record: &Record) -> bool {
        let value = |field: &String| {
            record
                .properties
                .get(field)
                .map_or(Scalar::Empty, FieldValue::decode)
        };
        match self {
            Filter::Equals { field, value: wanted } => value(field).matches(wanted),
            Filter::OnOrAfter { field, date } => value(field)
                .as_date()
                .is_some_and(|span| span.start >= *date),
            Filter::Before { field, date } => value(field)
                .as_date()
                .is_some_and(|span| span.start < *date),
            Filter::Contains { field, value: wanted } => match value(field) {
                Scalar::List(items) => items.iter().any(|item| item == wanted),
                other => other.as_text().is_some_and(|text| text.contains(wanted.as_str())),
            },
            Filter::And(filters) => filters.iter().all(|filter| filter.matches(record)),
            Filter::Or(filters) => filters.iter().any(|filter| filter.matches(record)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    /// Actual field key.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
}

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A paged query against one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Optional filter.
    pub filter: Option<Filter>,
    /// Optional sort key.
    pub sort: Option<Sort>,
    /// Maximum records per page.
    pub page_size: usize,
    /// Cursor returned by the previous page.
    pub cursor: Option<String>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filter: None,
            sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            cursor: None,
        }
    }
}

impl Query {
    /// A query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets an optional filter.
    pub fn filter_opt(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the sort key.
    pub fn sort(mut self, field: &str, direction: Direction) -> Self {
        self.sort = Some(Sort {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Sets the page size.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Continues after `cursor`.
    pub fn after(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor;
        self
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Records on this page.
    pub records: Vec<Record>,
    /// Whether more records follow.
    pub has_more: bool,
    /// Cursor for the next page.
    pub next_cursor: Option<String>,
}

/// The operations the engine needs from a document store.
///
/// Implementations must be shareable across request handlers.
pub trait DocumentStore: Send + Sync {
    /// Runs a paged query against `collection`.
    fn query(&self, collection: &str, query: &Query) -> StoreResult<Page>;

    /// Creates a record and returns its id.
    fn create(&self, collection: &str, properties: Properties) -> StoreResult<RecordId>;

    /// Overwrites the given properties of an existing record.
    fn update(&self, collection: &str, id: RecordId, properties: Properties) -> StoreResult<()>;

    /// Returns the collection's current schema.
    fn schema(&self, collection: &str) -> StoreResult<CollectionSchema>;
}

/// Runs `query` and follows cursors until every page has been read.
pub fn query_all(
    store: &dyn DocumentStore,
    collection: &str,
    query: &Query,
) -> StoreResult<Vec<Record>> {
    let mut records = Vec::new();
    let mut cursor = query.cursor.clone();
    loop {
        let page = store.query(collection, &query.clone().after(cursor))?;
        records.extend(page.records);
        if !page.has_more || page.next_cursor.is_none() {
            return Ok(records);
        }
        cursor = page.next_cursor;
    }
}
