//! Store-backed operations.
//!
//! The [`Engine`] owns the configuration and the cached store. Each
//! component borrows it for the duration of one operation:
//!
//! - [`AttendanceLedger`] reads attendance records.
//! - [`LunchCalculator`] settles the meal subsidy.
//! - [`OvertimeAccrual`] syncs roster counts and computes overtime pay.
//! - [`VacationLedger`] tracks vacation balances and cash-out.
//! - [`PayrollAggregator`] reads, drafts and saves payroll records.
//! - [`OperationLog`] records every write, best-effort.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use entitlement_engine::config::EngineConfig;
//! use entitlement_engine::models::Period;
//! use entitlement_engine::services::Engine;
//! use entitlement_engine::store::InMemoryStore;
//!
//! let config = EngineConfig::default();
//! let store = Arc::new(InMemoryStore::provisioned(&config.collections));
//! let engine = Engine::new(store, config);
//!
//! let settlement = engine.lunch().settle("A", Period::new(2026, 3).unwrap());
//! assert_eq!(settlement.eligible_days, 0);
//! ```

mod attendance;
mod lunch;
mod oplog;
mod overtime;
mod payroll;
mod vacation;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Collection, EngineConfig};
use crate::error::EngineResult;
use crate::schema::{FieldMap, fields};
use crate::store::{
    CachedStore, DocumentStore, Filter, Properties, Query, Record, RecordId, query_all,
};

pub use attendance::AttendanceLedger;
pub use lunch::LunchCalculator;
pub use oplog::{OperationLog, OperationOutcome};
pub use overtime::OvertimeAccrual;
pub use payroll::PayrollAggregator;
pub use vacation::VacationLedger;

/// The engine: configuration plus a cached view of the document store.
pub struct Engine {
    config: EngineConfig,
    store: CachedStore,
}

impl Engine {
    /// Creates an engine over `store`, caching reads for the configured TTL.
    pub fn new(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        let ttl = Duration::from_secs(config.cache.ttl_secs);
        Self {
            store: CachedStore::new(store, ttl),
            config,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The cached store.
    pub fn store(&self) -> &CachedStore {
        &self.store
    }

    /// Attendance reader.
    pub fn attendance(&self) -> AttendanceLedger<'_> {
        AttendanceLedger::new(self)
    }

    /// Meal subsidy calculator.
    pub fn lunch(&self) -> LunchCalculator<'_> {
        LunchCalculator::new(self)
    }

    /// Overtime accrual.
    pub fn overtime(&self) -> OvertimeAccrual<'_> {
        OvertimeAccrual::new(self)
    }

    /// Vacation ledger.
    pub fn vacation(&self) -> VacationLedger<'_> {
        VacationLedger::new(self)
    }

    /// Payroll aggregator.
    pub fn payroll(&self) -> PayrollAggregator<'_> {
        PayrollAggregator::new(self)
    }

    /// Operation log.
    pub fn oplog(&self) -> OperationLog<'_> {
        OperationLog::new(self)
    }

    /// Resolves the collection id and builds its field map from the
    /// (cached) schema. The employee field falls back to the title field.
    pub(crate) fn open(
        &self,
        collection: Collection,
        logical: &[&'static str],
    ) -> EngineResult<Access<'_>> {
        self.open_with(collection, logical, FieldMap::build)
    }

    /// Like [`Engine::open`], with prefix matching as a last resort.
    pub(crate) fn open_with_prefix(
        &self,
        collection: Collection,
        logical: &[&'static str],
    ) -> EngineResult<Access<'_>> {
        self.open_with(collection, logical, FieldMap::build_with_prefix)
    }

    fn open_with(
        &self,
        collection: Collection,
        logical: &[&'static str],
        build: fn(&str, &crate::schema::CollectionSchema, &[&'static str]) -> FieldMap,
    ) -> EngineResult<Access<'_>> {
        let id = self.config.collections.require(collection)?;
        let schema = self.store.schema(id)?;
        let mut fields = build(collection.name(), &schema, logical);
        if logical.contains(&fields::EMPLOYEE) {
            fields = fields.with_title_fallback(&schema, fields::EMPLOYEE);
        }
        Ok(Access {
            engine: self,
            id,
            fields,
        })
    }
}

/// Outcome of a keyed upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Upserted {
    Created(RecordId),
    Updated(RecordId),
}

impl Upserted {
    pub(crate) fn id(self) -> RecordId {
        match self {
            Upserted::Created(id) | Upserted::Updated(id) => id,
        }
    }
}

/// One opened collection: its id and resolved fields.
pub(crate) struct Access<'a> {
    engine: &'a Engine,
    pub(crate) id: &'a str,
    pub(crate) fields: FieldMap,
}

impl Access<'_> {
    /// Every record matching `filter`, read through the cache.
    pub(crate) fn find_all(&self, filter: Option<Filter>) -> EngineResult<Vec<Record>> {
        let query = Query::new().filter_opt(filter);
        Ok(query_all(&self.engine.store, self.id, &query)?)
    }

    /// The first record matching `filter`, read through the cache.
    pub(crate) fn find_first(&self, filter: Filter) -> EngineResult<Option<Record>> {
        let query = Query::new().filter(filter).page_size(1);
        let page = self.engine.store.query(self.id, &query)?;
        Ok(page.records.into_iter().next())
    }

    /// The first record matching `filter`, read straight from the store.
    pub(crate) fn find_fresh(&self, filter: Filter) -> EngineResult<Option<Record>> {
        let query = Query::new().filter(filter).page_size(1);
        let page = self.engine.store.query_fresh(self.id, &query)?;
        Ok(page.records.into_iter().next())
    }

    /// Updates the record matching `key`, or creates one when none does.
    ///
    /// The lookup bypasses the cache so a record created moments earlier is
    /// always found and never duplicated.
    pub(crate) fn upsert(&self, key: Filter, properties: Properties) -> EngineResult<Upserted> {
        match self.find_fresh(key)? {
            Some(existing) => {
                self.engine
                    .store
                    .update(self.id, existing.id, properties)?;
                Ok(Upserted::Updated(existing.id))
            }
            None => Ok(Upserted::Created(self.engine.store.create(self.id, properties)?)),
        }
    }

    /// Creates a record without looking for an existing one.
    pub(crate) fn create(&self, properties: Properties) -> EngineResult<RecordId> {
        Ok(self.engine.store.create(self.id, properties)?)
    }

    /// Drops cached reads of this collection.
    pub(crate) fn invalidate(&self) {
        self.engine.store.invalidate(self.id);
    }

    /// Equality filter on `logical`; `None` when the field did not resolve.
    pub(crate) fn equals(&self, logical: &str, value: impl Into<crate::schema::Scalar>) -> Option<Filter> {
        self.fields.key(logical).map(|key| Filter::equals(key, value))
    }
}

/// Trims `employee`, failing with `MissingField` when it is blank.
pub(crate) fn require_employee(employee: &str) -> EngineResult<&str> {
    let employee = employee.trim();
    if employee.is_empty() {
        return Err(crate::error::EngineError::MissingField {
            field: fields::EMPLOYEE.to_string(),
        });
    }
    Ok(employee)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for service tests.

    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::Engine;
    use crate::config::EngineConfig;
    use crate::schema::{DateSpan, FieldValue};
    use crate::store::{DocumentStore, InMemoryStore, Properties};

    pub(crate) fn engine() -> (Arc<InMemoryStore>, Engine) {
        engine_with(EngineConfig::default())
    }

    pub(crate) fn engine_with(config: EngineConfig) -> (Arc<InMemoryStore>, Engine) {
        let store = Arc::new(InMemoryStore::provisioned(&config.collections));
        let engine = Engine::new(store.clone(), config);
        (store, engine)
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn title(value: &str) -> FieldValue {
        FieldValue::Title(value.to_string())
    }

    pub(crate) fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    pub(crate) fn select(value: &str) -> FieldValue {
        FieldValue::Select(Some(value.to_string()))
    }

    pub(crate) fn number(value: i64) -> FieldValue {
        FieldValue::Number(Some(Decimal::from(value)))
    }

    pub(crate) fn day(value: NaiveDate) -> FieldValue {
        FieldValue::Date(Some(DateSpan::day(value)))
    }

    pub(crate) fn insert(store: &InMemoryStore, collection: &str, pairs: Vec<(&str, FieldValue)>) {
        let properties: Properties = pairs
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        store.create(collection, properties).unwrap();
    }
}
