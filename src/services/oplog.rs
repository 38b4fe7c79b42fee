//! Best-effort operation log.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Collection;
use crate::error::EngineResult;
use crate::schema::fields::oplog;
use crate::store::Properties;

use super::Engine;

/// Actor recorded when the caller does not name one.
pub const SYSTEM_ACTOR: &str = "system";

/// Outcome of a logged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The write went through.
    Success,
    /// The write was refused or failed validation.
    Failure,
    /// The store or configuration failed.
    SystemError,
}

impl OperationOutcome {
    /// Label stored in the result field.
    pub fn label(self) -> &'static str {
        match self {
            OperationOutcome::Success => "成功",
            OperationOutcome::Failure => "失敗",
            OperationOutcome::SystemError => "系統錯誤",
        }
    }
}

/// Writes one entry per engine write to the operation log collection.
pub struct OperationLog<'a> {
    engine: &'a Engine,
}

impl<'a> OperationLog<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Records an operation. Returns true when the entry was written.
    ///
    /// Logging never fails the operation it describes: an unconfigured
    /// collection is a no-op and store failures are only traced.
    pub fn record(
        &self,
        actor: Option<&str>,
        action: &str,
        content: &str,
        outcome: OperationOutcome,
    ) -> bool {
        if self.engine.config().collections.get(Collection::Oplog).is_none() {
            debug!(action = %action, "Operation log not configured, entry skipped");
            return false;
        }
        match self.write(actor, action, content, outcome) {
            Ok(()) => true,
            Err(error) => {
                warn!(action = %action, error = %error, "Operation log write failed");
                false
            }
        }
    }

    fn write(
        &self,
        actor: Option<&str>,
        action: &str,
        content: &str,
        outcome: OperationOutcome,
    ) -> EngineResult<()> {
        let access = self.engine.open(
            Collection::Oplog,
            &[
                oplog::EMPLOYEE,
                oplog::ACTION,
                oplog::CONTENT,
                oplog::RESULT,
                oplog::TIME,
            ],
        )?;
        let actor = actor
            .map(str::trim)
            .filter(|actor| !actor.is_empty())
            .unwrap_or(SYSTEM_ACTOR);

        let mut properties = Properties::new();
        access.fields.put(&mut properties, oplog::EMPLOYEE, actor);
        access.fields.put(&mut properties, oplog::ACTION, action);
        access.fields.put(&mut properties, oplog::CONTENT, content);
        access.fields.put(&mut properties, oplog::RESULT, outcome.label());
        access
            .fields
            .put(&mut properties, oplog::TIME, Local::now().date_naive());

        access.create(properties)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectionIds, EngineConfig};
    use crate::schema::{FieldValue, Scalar};
    use crate::services::testing::{engine, engine_with};

    #[test]
    fn test_record_writes_entry() {
        let (store, engine) = engine();
        assert!(engine.oplog().record(
            Some("admin"),
            "upsert_overtime_rule",
            "2026-03",
            OperationOutcome::Success
        ));

        let records = store.records("oplog");
        assert_eq!(records.len(), 1);
        let properties = &records[0].properties;
        assert_eq!(properties.get("員工姓名"), Some(&FieldValue::Title("admin".to_string())));
        assert_eq!(
            properties.get("操作結果").map(FieldValue::decode),
            Some(Scalar::Text("成功".to_string()))
        );
        assert!(matches!(properties.get("操作時間"), Some(FieldValue::Date(Some(_)))));
    }

    #[test]
    fn test_blank_actor_becomes_system() {
        let (store, engine) = engine();
        engine
            .oplog()
            .record(Some("  "), "sync", "", OperationOutcome::Failure);
        let records = store.records("oplog");
        assert_eq!(
            records[0].properties.get("員工姓名"),
            Some(&FieldValue::Title(SYSTEM_ACTOR.to_string()))
        );
    }

    #[test]
    fn test_unconfigured_collection_is_noop() {
        let config = EngineConfig {
            collections: CollectionIds {
                oplog: None,
                ..CollectionIds::default()
            },
            ..EngineConfig::default()
        };
        let (_store, engine) = engine_with(config);
        assert!(!engine.oplog().record(None, "sync", "", OperationOutcome::Success));
    }

    #[test]
    fn test_store_failure_is_swallowed() {
        let (store, engine) = engine();
        store.set_unavailable("oplog");
        assert!(!engine.oplog().record(None, "sync", "", OperationOutcome::SystemError));
        assert!(store.records("oplog").is_empty());
    }

    #[test]
    fn test_outcome_labels_match_result_options() {
        let schema = crate::schema::canonical::oplog();
        let options = &schema.field("操作結果").unwrap().options;
        for outcome in [
            OperationOutcome::Success,
            OperationOutcome::Failure,
            OperationOutcome::SystemError,
        ] {
            assert!(options.iter().any(|option| option == outcome.label()));
        }
    }
}
