//! Attendance ledger reader.

use tracing::debug;

use crate::config::Collection;
use crate::error::EngineResult;
use crate::models::{AttendanceRecord, AttendanceStatus, Period};
use crate::schema::{Scalar, fields::attendance};
use crate::store::Filter;

use super::Engine;

/// Reads daily attendance records.
pub struct AttendanceLedger<'a> {
    engine: &'a Engine,
}

fn parse_status(value: &Scalar) -> Option<AttendanceStatus> {
    match value {
        Scalar::List(labels) => labels
            .iter()
            .find_map(|label| AttendanceStatus::from_label(label)),
        other => other
            .as_text()
            .and_then(|label| AttendanceStatus::from_label(&label)),
    }
}

impl<'a> AttendanceLedger<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Every attendance record of `employee` dated inside `period`.
    ///
    /// Records with no date or an unknown status are skipped. Duplicates
    /// for the same day are returned as they are.
    ///
    /// # Errors
    ///
    /// - `ConfigurationMissing` when the attendance collection is not configured
    /// - `SchemaMismatch` when the employee or date field cannot be resolved
    /// - `Store` when the store cannot be read
    pub fn records(&self, employee: &str, period: Period) -> EngineResult<Vec<AttendanceRecord>> {
        let access = self.engine.open(
            Collection::Attendance,
            &[attendance::EMPLOYEE, attendance::DATE, attendance::STATUS],
        )?;
        let date_key = access.fields.require(attendance::DATE)?.key.clone();

        let filter = Filter::And(vec![
            access.fields.naming(attendance::EMPLOYEE, employee)?,
            Filter::date_range(&date_key, period.start(), period.end_exclusive()),
        ]);
        let records = access.find_all(Some(filter))?;
        let total = records.len();

        let parsed: Vec<AttendanceRecord> = records
            .iter()
            .filter_map(|record| {
                let date = access.fields.read(record, attendance::DATE).as_date()?.start;
                let status = parse_status(&access.fields.read(record, attendance::STATUS))?;
                Some(AttendanceRecord {
                    employee: employee.trim().to_string(),
                    date,
                    status,
                })
            })
            .collect();

        debug!(
            employee = %employee,
            period = %period,
            read = total,
            kept = parsed.len(),
            "Attendance records read"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::schema::{CollectionSchema, FieldKind, FieldValue};
    use crate::services::testing::{date, day, engine, insert, select, title};

    #[test]
    fn test_reads_only_employee_and_month() {
        let (store, engine) = engine();
        insert(&store, "attendance", vec![
            ("員工姓名", title("B")),
            ("出勤日期", day(date(2026, 3, 2))),
            ("出勤狀態", select("出席")),
        ]);
        insert(&store, "attendance", vec![
            ("員工姓名", title("A")),
            ("出勤日期", day(date(2026, 3, 2))),
            ("出勤狀態", select("出席")),
        ]);
        insert(&store, "attendance", vec![
            ("員工姓名", title("B")),
            ("出勤日期", day(date(2026, 4, 1))),
            ("出勤狀態", select("出席")),
        ]);

        let records = engine
            .attendance()
            .records("B", Period::new(2026, 3).unwrap())
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Present);
        assert_eq!(records[0].date, date(2026, 3, 2));
    }

    #[test]
    fn test_status_stored_as_text_is_read() {
        let (store, engine) = engine();
        store.register(
            "attendance",
            CollectionSchema::new()
                .with_field("員工姓名", FieldKind::Title)
                .with_field("出勤日期", FieldKind::Date)
                .with_field("出勤狀態", FieldKind::Text),
        );
        insert(&store, "attendance", vec![
            ("員工姓名", title("B")),
            ("出勤日期", day(date(2026, 3, 3))),
            ("出勤狀態", FieldValue::Text("遲到".to_string())),
        ]);

        let records = engine
            .attendance()
            .records("B", Period::new(2026, 3).unwrap())
            .unwrap();
        assert_eq!(records[0].status, AttendanceStatus::Late);
    }

    #[test]
    fn test_record_shared_by_several_employees_is_read_for_each() {
        let (store, engine) = engine();
        store.register(
            "attendance",
            CollectionSchema::new()
                .with_multi_select("員工姓名", &[])
                .with_field("出勤日期", FieldKind::Date)
                .with_select("出勤狀態", &["出席", "請假", "遲到"]),
        );
        insert(&store, "attendance", vec![
            ("員工姓名", FieldValue::MultiSelect(vec!["A".to_string(), "B".to_string()])),
            ("出勤日期", day(date(2026, 3, 2))),
            ("出勤狀態", select("出席")),
        ]);

        let period = Period::new(2026, 3).unwrap();
        assert_eq!(engine.attendance().records("A", period).unwrap().len(), 1);
        assert_eq!(engine.attendance().records("B", period).unwrap().len(), 1);
        assert!(engine.attendance().records("C", period).unwrap().is_empty());
    }

    #[test]
    fn test_status_stored_as_multi_select_is_read() {
        assert_eq!(
            parse_status(&Scalar::List(vec!["x".to_string(), "請假".to_string()])),
            Some(AttendanceStatus::Leave)
        );
    }

    #[test]
    fn test_missing_date_field_is_schema_mismatch() {
        let (store, engine) = engine();
        store.register(
            "attendance",
            CollectionSchema::new()
                .with_field("員工姓名", FieldKind::Title)
                .with_field("出勤狀態", FieldKind::Text),
        );

        let result = engine.attendance().records("B", Period::new(2026, 3).unwrap());
        assert!(matches!(result, Err(EngineError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_unavailable_collection_is_store_error() {
        let (store, engine) = engine();
        store.set_unavailable("attendance");

        let result = engine.attendance().records("B", Period::new(2026, 3).unwrap());
        assert!(matches!(result, Err(EngineError::Store(_))));
    }
}
