//! Vacation balances, leave consumption and year-end cash-out.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::calculation::{calculate_cashout, remaining_hours};
use crate::config::Collection;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BatchOutcome, CashoutRule, Period, VacationSnapshot, VacationYearRecord, YearEndCashout,
};
use crate::schema::fields::{cashout_rule, leave, vacation};
use crate::store::{Filter, Properties, Record};

use super::{Access, Engine, OperationOutcome, require_employee};

const LEAVE_FIELDS: [&str; 5] = [
    leave::EMPLOYEE,
    leave::LEAVE_TYPE,
    leave::STATUS,
    leave::PERIOD,
    leave::HOURS,
];

const VACATION_FIELDS: [&str; 5] = [
    vacation::EMPLOYEE,
    vacation::YEAR,
    vacation::ENTITLED,
    vacation::USED,
    vacation::REMAINING,
];

const RULE_FIELDS: [&str; 5] = [
    cashout_rule::NAME,
    cashout_rule::YEAR,
    cashout_rule::CAP_DAYS,
    cashout_rule::HOURS_PER_DAY,
    cashout_rule::AMOUNT_PER_HOUR,
];

/// Status label assumed approved when the status field offers none of the
/// known synonyms.
pub const DEFAULT_APPROVED_STATUS: &str = "通過";

/// Picks the approved label from a status field's options.
pub fn approved_status(options: &[String]) -> &str {
    leave::APPROVED_STATUSES
        .iter()
        .find(|label| options.iter().any(|option| option == *label))
        .copied()
        .unwrap_or(DEFAULT_APPROVED_STATUS)
}

fn year_bounds(year: i32) -> EngineResult<(NaiveDate, NaiveDate)> {
    Ok((
        Period::new(year, 1)?.start(),
        Period::new(year, 12)?.end_exclusive(),
    ))
}

fn year_key(access: &Access<'_>, employee: &str, year: i32) -> EngineResult<Filter> {
    Ok(Filter::And(vec![
        Filter::equals(&access.fields.require(vacation::EMPLOYEE)?.key, employee),
        Filter::equals(&access.fields.require(vacation::YEAR)?.key, year),
    ]))
}

fn rule_key(access: &Access<'_>, year: i32) -> EngineResult<Filter> {
    access
        .equals(cashout_rule::YEAR, year)
        .or_else(|| access.equals(cashout_rule::NAME, year.to_string()))
        .ok_or_else(|| EngineError::SchemaMismatch {
            collection: access.fields.collection().to_string(),
            field: cashout_rule::YEAR.to_string(),
        })
}

fn read_year_record(access: &Access<'_>, record: &Record, employee: &str, year: i32) -> VacationYearRecord {
    let number = |logical: &str| access.fields.read(record, logical).as_number();
    VacationYearRecord {
        id: record.id,
        employee: employee.to_string(),
        year,
        entitled_hours: number(vacation::ENTITLED).unwrap_or(Decimal::ZERO),
        used_hours: number(vacation::USED),
        remaining_hours: number(vacation::REMAINING),
    }
}

/// Tracks annual leave balances per employee and year.
pub struct VacationLedger<'a> {
    engine: &'a Engine,
}

impl<'a> VacationLedger<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    // ── Consumption ──────────────────────────────────────────

    /// Hours of approved annual leave starting in `year`.
    ///
    /// Always recomputed from the leave requests; any stored used-hours
    /// value is ignored.
    pub fn used_hours(&self, employee: &str, year: i32) -> EngineResult<Decimal> {
        let employee = require_employee(employee)?;
        let (start, end) = year_bounds(year)?;
        let access = self.engine.open(Collection::Leave, &LEAVE_FIELDS)?;
        let status = access.fields.require(leave::STATUS)?;
        let approved = approved_status(&status.options);

        let filter = Filter::And(vec![
            access.fields.naming(leave::EMPLOYEE, employee)?,
            Filter::equals(&access.fields.require(leave::LEAVE_TYPE)?.key, leave::ANNUAL_LEAVE),
            Filter::equals(&status.key, approved),
            Filter::date_range(&access.fields.require(leave::PERIOD)?.key, start, end),
        ]);
        access.fields.require(leave::HOURS)?;

        let used: Decimal = access
            .find_all(Some(filter))?
            .iter()
            .filter_map(|record| access.fields.read(record, leave::HOURS).as_number())
            .sum();
        debug!(employee = %employee, year, approved = %approved, used = %used, "Annual leave used");
        Ok(used)
    }

    // ── Year records ─────────────────────────────────────────

    /// The stored balance record of `employee` for `year`, if any.
    pub fn year_record(&self, employee: &str, year: i32) -> EngineResult<Option<VacationYearRecord>> {
        let employee = require_employee(employee)?;
        let access = self.engine.open(Collection::Vacation, &VACATION_FIELDS)?;
        let record = access.find_first(year_key(&access, employee, year)?)?;
        Ok(record.map(|record| read_year_record(&access, &record, employee, year)))
    }

    /// Returns the balance record of `employee` for `year`, creating it
    /// with `default_entitled` hours when there is none.
    ///
    /// The lookup bypasses the read cache, so calling this twice never
    /// creates two records.
    pub fn ensure_year_record(
        &self,
        employee: &str,
        year: i32,
        default_entitled: Decimal,
    ) -> EngineResult<VacationYearRecord> {
        let employee = require_employee(employee)?;
        let access = self.engine.open(Collection::Vacation, &VACATION_FIELDS)?;
        let key = year_key(&access, employee, year)?;

        if let Some(record) = access.find_fresh(key)? {
            return Ok(read_year_record(&access, &record, employee, year));
        }

        let mut properties = Properties::new();
        access.fields.put_key(&mut properties, vacation::EMPLOYEE, employee)?;
        access.fields.put_key(&mut properties, vacation::YEAR, year)?;
        access.fields.put(&mut properties, vacation::ENTITLED, default_entitled);
        access.fields.put(&mut properties, vacation::USED, Decimal::ZERO);
        access.fields.put(&mut properties, vacation::REMAINING, default_entitled);
        let id = access.create(properties)?;
        access.invalidate();

        info!(employee = %employee, year, entitled = %default_entitled, "Vacation year record created");
        Ok(VacationYearRecord {
            id,
            employee: employee.to_string(),
            year,
            entitled_hours: default_entitled,
            used_hours: Some(Decimal::ZERO),
            remaining_hours: Some(default_entitled),
        })
    }

    /// Entitled, used and remaining hours of `employee` for `year`.
    ///
    /// Ensures the year record exists, then recomputes used hours from the
    /// leave requests. Remaining hours never go below zero.
    pub fn snapshot(&self, employee: &str, year: i32) -> EngineResult<VacationSnapshot> {
        let record = self.ensure_year_record(employee, year, Decimal::ZERO)?;
        let used_hours = self.used_hours(&record.employee, year)?;
        Ok(VacationSnapshot {
            remaining_hours: remaining_hours(record.entitled_hours, used_hours),
            employee: record.employee,
            year,
            entitled_hours: record.entitled_hours,
            used_hours,
        })
    }

    /// Checks that `requested_hours` of annual leave fit the remaining
    /// balance.
    ///
    /// # Errors
    ///
    /// - `InsufficientLeave` when the request exceeds the remaining hours
    /// - `InvalidRule` when the request is negative
    pub fn validate_sufficient(
        &self,
        employee: &str,
        year: i32,
        requested_hours: Decimal,
    ) -> EngineResult<VacationSnapshot> {
        if requested_hours < Decimal::ZERO {
            return Err(EngineError::InvalidRule {
                message: format!("requested hours ({requested_hours}) must not be negative"),
            });
        }
        let snapshot = self.snapshot(employee, year)?;
        if requested_hours > snapshot.remaining_hours {
            warn!(
                employee = %snapshot.employee,
                year,
                remaining = %snapshot.remaining_hours,
                requested = %requested_hours,
                "Annual leave request exceeds balance"
            );
            return Err(EngineError::InsufficientLeave {
                remaining: snapshot.remaining_hours,
                requested: requested_hours,
            });
        }
        Ok(snapshot)
    }

    /// Sets the entitled hours of each listed employee for `year`.
    ///
    /// Each employee is handled independently. The stored remaining hours
    /// are refreshed alongside.
    pub fn set_entitlements(
        &self,
        year: i32,
        entitlements: &[(String, Decimal)],
        actor: Option<&str>,
    ) -> BatchOutcome<String> {
        let mut outcome = BatchOutcome::new();
        for (employee, hours) in entitlements {
            match self.set_entitlement(employee, year, *hours) {
                Ok(()) => outcome.succeed(employee.trim().to_string()),
                Err(error) => {
                    warn!(employee = %employee, year, error = %error, "Entitlement update failed");
                    outcome.fail(employee.trim().to_string(), error.to_string());
                }
            }
        }
        if let Ok(id) = self.engine.config().collections.require(Collection::Vacation) {
            self.engine.store().invalidate(id);
        }

        let (succeeded, failed) = outcome.counts();
        info!(year, succeeded, failed, "Entitlements updated");
        self.engine.oplog().record(
            actor,
            "set_entitlements",
            &format!("{year}: {succeeded} succeeded, {failed} failed"),
            if outcome.is_complete() {
                OperationOutcome::Success
            } else {
                OperationOutcome::Failure
            },
        );
        outcome
    }

    fn set_entitlement(&self, employee: &str, year: i32, hours: Decimal) -> EngineResult<()> {
        if hours < Decimal::ZERO {
            return Err(EngineError::InvalidRule {
                message: format!("entitled hours ({hours}) must not be negative"),
            });
        }
        let record = self.ensure_year_record(employee, year, hours)?;
        let used = self
            .used_hours(&record.employee, year)
            .ok()
            .or(record.used_hours)
            .unwrap_or(Decimal::ZERO);

        let access = self.engine.open(Collection::Vacation, &VACATION_FIELDS)?;
        let mut properties = Properties::new();
        access.fields.put_key(&mut properties, vacation::EMPLOYEE, record.employee.as_str())?;
        access.fields.put_key(&mut properties, vacation::YEAR, year)?;
        access.fields.put(&mut properties, vacation::ENTITLED, hours);
        access
            .fields
            .put(&mut properties, vacation::REMAINING, remaining_hours(hours, used));
        access.upsert(year_key(&access, &record.employee, year)?, properties)?;
        Ok(())
    }

    // ── Cash-out ─────────────────────────────────────────────

    /// The cash-out rule stored for `year`, if any.
    pub fn cashout_rule(&self, year: i32) -> EngineResult<Option<CashoutRule>> {
        let access = self.engine.open(Collection::CashoutRule, &RULE_FIELDS)?;
        let record = access.find_first(rule_key(&access, year)?)?;
        Ok(record.map(|record| {
            let number = |logical: &str| {
                access
                    .fields
                    .read(&record, logical)
                    .as_number()
                    .unwrap_or(Decimal::ZERO)
            };
            CashoutRule {
                year,
                cap_days: number(cashout_rule::CAP_DAYS),
                hours_per_day: number(cashout_rule::HOURS_PER_DAY),
                amount_per_hour: number(cashout_rule::AMOUNT_PER_HOUR),
            }
        }))
    }

    /// Creates or replaces the cash-out rule for `rule.year`.
    ///
    /// # Errors
    ///
    /// - `InvalidRule` when hours per day is not positive, or the cap or
    ///   hourly amount is negative; nothing is written
    /// - `Store` when the write fails
    pub fn upsert_cashout_rule(&self, rule: &CashoutRule, actor: Option<&str>) -> EngineResult<CashoutRule> {
        let result = self.write_cashout_rule(rule);
        let (outcome, content) = match &result {
            Ok(()) => (
                OperationOutcome::Success,
                format!(
                    "{}: cap {} days, {} hours/day, {} per hour",
                    rule.year, rule.cap_days, rule.hours_per_day, rule.amount_per_hour
                ),
            ),
            Err(error) if error.is_degradable() => (OperationOutcome::SystemError, error.to_string()),
            Err(error) => (OperationOutcome::Failure, error.to_string()),
        };
        self.engine
            .oplog()
            .record(actor, "upsert_cashout_rule", &content, outcome);
        result.map(|()| rule.clone())
    }

    fn write_cashout_rule(&self, rule: &CashoutRule) -> EngineResult<()> {
        if rule.hours_per_day <= Decimal::ZERO {
            return Err(EngineError::InvalidRule {
                message: format!("hours per day ({}) must be positive", rule.hours_per_day),
            });
        }
        if rule.cap_days < Decimal::ZERO || rule.amount_per_hour < Decimal::ZERO {
            return Err(EngineError::InvalidRule {
                message: format!(
                    "cap days ({}) and amount per hour ({}) must not be negative",
                    rule.cap_days, rule.amount_per_hour
                ),
            });
        }
        let access = self.engine.open(Collection::CashoutRule, &RULE_FIELDS)?;
        let key = rule_key(&access, rule.year)?;

        let mut properties = Properties::new();
        if access.fields.contains(cashout_rule::YEAR) {
            access.fields.put_key(&mut properties, cashout_rule::YEAR, rule.year)?;
            access.fields.put(&mut properties, cashout_rule::NAME, rule.year.to_string());
        } else {
            access.fields.put_key(&mut properties, cashout_rule::NAME, rule.year.to_string())?;
        }
        access.fields.put(&mut properties, cashout_rule::CAP_DAYS, rule.cap_days);
        access.fields.put(&mut properties, cashout_rule::HOURS_PER_DAY, rule.hours_per_day);
        access.fields.put(&mut properties, cashout_rule::AMOUNT_PER_HOUR, rule.amount_per_hour);

        let upserted = access.upsert(key, properties);
        access.invalidate();
        upserted?;
        info!(year = rule.year, hours_per_day = %rule.hours_per_day, "Cash-out rule saved");
        Ok(())
    }

    /// Year-end cash-out of the remaining balance of `employee`.
    ///
    /// Uses the year's rule, or the configured defaults when there is none
    /// or the rule collection cannot be read.
    pub fn year_end_cashout(&self, employee: &str, year: i32) -> EngineResult<YearEndCashout> {
        let snapshot = self.snapshot(employee, year)?;
        let stored = match self.cashout_rule(year) {
            Ok(rule) => rule,
            Err(error) if error.is_degradable() => {
                warn!(year, error = %error, "Cash-out rule unavailable, using defaults");
                None
            }
            Err(error) => return Err(error),
        };
        let rule_is_default = stored.is_none();
        let rule = stored.unwrap_or_else(|| CashoutRule::fallback(year, &self.engine.config().cashout));

        let result = calculate_cashout(
            snapshot.remaining_hours,
            rule.hours_per_day,
            rule.cap_days,
            rule.amount_per_day(),
            self.engine.config().cashout.whole_days_only,
        );
        info!(
            employee = %snapshot.employee,
            year,
            cashout_days = %result.cashout_days,
            cashout_amount = %result.cashout_amount,
            "Year-end cash-out computed"
        );
        Ok(YearEndCashout {
            snapshot,
            rule,
            rule_is_default,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CollectionSchema, DateSpan, FieldKind, FieldValue};
    use crate::services::testing::{date, engine, insert, number, select, title};
    use crate::store::InMemoryStore;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn leave_request(store: &InMemoryStore, employee: &str, kind: &str, status: &str, start: NaiveDate, hours: i64) {
        insert(store, "leave", vec![
            ("員工姓名", title(employee)),
            ("假別", select(kind)),
            ("狀態", select(status)),
            (
                "請假期間",
                FieldValue::Date(Some(DateSpan {
                    start,
                    end: Some(start),
                })),
            ),
            ("請假時數", number(hours)),
        ]);
    }

    // ==========================================================================
    // Used hours
    // ==========================================================================

    #[test]
    fn test_used_hours_counts_only_approved_annual_leave_in_year() {
        let (store, engine) = engine();
        leave_request(&store, "A", "特休", "通過", date(2026, 3, 2), 8);
        leave_request(&store, "A", "特休", "通過", date(2026, 12, 31), 4);
        leave_request(&store, "A", "特休", "待審核", date(2026, 4, 1), 8);
        leave_request(&store, "A", "病假", "通過", date(2026, 4, 2), 8);
        leave_request(&store, "A", "特休", "通過", date(2025, 12, 31), 8);
        leave_request(&store, "B", "特休", "通過", date(2026, 5, 1), 8);

        assert_eq!(engine.vacation().used_hours("A", 2026).unwrap(), dec("12"));
    }

    #[test]
    fn test_approved_label_is_chosen_from_options() {
        let options = vec!["待審核".to_string(), "已核准".to_string(), "核准".to_string()];
        assert_eq!(approved_status(&options), "核准");
        assert_eq!(approved_status(&[]), DEFAULT_APPROVED_STATUS);
    }

    #[test]
    fn test_used_hours_with_custom_approval_vocabulary() {
        let (store, engine) = engine();
        store.register(
            "leave",
            CollectionSchema::new()
                .with_field("員工姓名", FieldKind::Title)
                .with_select("假別", &["特休"])
                .with_select("狀態", &["審核中", "已核准"])
                .with_field("請假期間", FieldKind::Date)
                .with_field("請假時數", FieldKind::Number),
        );
        leave_request(&store, "A", "特休", "已核准", date(2026, 6, 1), 16);
        leave_request(&store, "A", "特休", "審核中", date(2026, 6, 2), 8);

        assert_eq!(engine.vacation().used_hours("A", 2026).unwrap(), dec("16"));
    }

    // ==========================================================================
    // Year records and snapshots
    // ==========================================================================

    #[test]
    fn test_ensure_year_record_is_idempotent() {
        let (store, engine) = engine();
        let first = engine.vacation().ensure_year_record("A", 2026, dec("56")).unwrap();
        let second = engine.vacation().ensure_year_record("A", 2026, dec("0")).unwrap();

        assert_eq!(store.record_count("vacation"), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(second.entitled_hours, dec("56"));
    }

    #[test]
    fn test_select_employee_without_option_creates_nothing() {
        let (store, engine) = engine();
        store.register(
            "vacation",
            crate::schema::canonical::vacation().with_select("員工姓名", &["X"]),
        );
        for _ in 0..2 {
            let result = engine.vacation().ensure_year_record("A", 2026, dec("56"));
            assert!(matches!(result, Err(EngineError::SchemaMismatch { .. })));
        }
        assert_eq!(store.record_count("vacation"), 0);

        let outcome = engine
            .vacation()
            .set_entitlements(2026, &[("A".to_string(), dec("56"))], None);
        assert_eq!(outcome.counts(), (0, 1));
        assert_eq!(store.record_count("vacation"), 0);
    }

    #[test]
    fn test_select_employee_with_option_is_idempotent() {
        let (store, engine) = engine();
        store.register(
            "vacation",
            crate::schema::canonical::vacation().with_select("員工姓名", &["A"]),
        );
        let first = engine.vacation().ensure_year_record("A", 2026, dec("56")).unwrap();
        let second = engine.vacation().ensure_year_record("A", 2026, dec("0")).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.record_count("vacation"), 1);
    }

    #[test]
    fn test_multi_select_employee_without_option_creates_nothing() {
        let (store, engine) = engine();
        store.register(
            "vacation",
            crate::schema::canonical::vacation().with_multi_select("員工姓名", &["X"]),
        );
        let result = engine.vacation().snapshot("A", 2026);

        assert!(matches!(result, Err(EngineError::SchemaMismatch { .. })));
        assert_eq!(store.record_count("vacation"), 0);
    }

    #[test]
    fn test_snapshot_creates_empty_record() {
        let (store, engine) = engine();
        let snapshot = engine.vacation().snapshot("A", 2026).unwrap();
        assert_eq!(snapshot.entitled_hours, Decimal::ZERO);
        assert_eq!(snapshot.remaining_hours, Decimal::ZERO);
        assert_eq!(store.record_count("vacation"), 1);
    }

    #[test]
    fn test_snapshot_ignores_stored_used_hours() {
        let (store, engine) = engine();
        insert(&store, "vacation", vec![
            ("員工姓名", title("A")),
            ("年度", number(2026)),
            ("本年度特休時數", number(56)),
            ("已使用特休時數", number(40)),
        ]);
        leave_request(&store, "A", "特休", "通過", date(2026, 2, 3), 16);

        let snapshot = engine.vacation().snapshot("A", 2026).unwrap();
        assert_eq!(snapshot.used_hours, dec("16"));
        assert_eq!(snapshot.remaining_hours, dec("40"));
    }

    #[test]
    fn test_validate_sufficient_reports_both_values() {
        let (_store, engine) = engine();
        engine.vacation().ensure_year_record("A", 2026, dec("10")).unwrap();

        match engine.vacation().validate_sufficient("A", 2026, dec("12")) {
            Err(EngineError::InsufficientLeave { remaining, requested }) => {
                assert_eq!(remaining, dec("10"));
                assert_eq!(requested, dec("12"));
            }
            other => panic!("Expected InsufficientLeave, got {:?}", other),
        }
        assert!(engine.vacation().validate_sufficient("A", 2026, dec("10")).is_ok());
    }

    #[test]
    fn test_blank_employee_is_missing_field() {
        let (_store, engine) = engine();
        assert!(matches!(
            engine.vacation().snapshot(" ", 2026),
            Err(EngineError::MissingField { .. })
        ));
    }

    // ==========================================================================
    // Entitlements
    // ==========================================================================

    #[test]
    fn test_set_entitlements_updates_existing_and_creates_missing() {
        let (store, engine) = engine();
        engine.vacation().ensure_year_record("A", 2026, dec("0")).unwrap();
        leave_request(&store, "A", "特休", "通過", date(2026, 2, 3), 8);

        let outcome = engine.vacation().set_entitlements(
            2026,
            &[("A".to_string(), dec("56")), ("B".to_string(), dec("24"))],
            Some("admin"),
        );
        assert_eq!(outcome.counts(), (2, 0));
        assert_eq!(store.record_count("vacation"), 2);

        let a = engine.vacation().year_record("A", 2026).unwrap().unwrap();
        assert_eq!(a.entitled_hours, dec("56"));
        assert_eq!(a.remaining_hours, Some(dec("48")));
        let b = engine.vacation().snapshot("B", 2026).unwrap();
        assert_eq!(b.remaining_hours, dec("24"));
    }

    #[test]
    fn test_set_entitlements_reports_bad_rows() {
        let (_store, engine) = engine();
        let outcome = engine.vacation().set_entitlements(
            2026,
            &[("".to_string(), dec("8")), ("C".to_string(), dec("-1"))],
            None,
        );
        assert_eq!(outcome.counts(), (0, 2));
    }

    // ==========================================================================
    // Cash-out
    // ==========================================================================

    #[test]
    fn test_cashout_rule_upsert_then_read() {
        let (store, engine) = engine();
        let rule = CashoutRule {
            year: 2026,
            cap_days: dec("3"),
            hours_per_day: dec("8"),
            amount_per_hour: dec("150"),
        };
        engine.vacation().upsert_cashout_rule(&rule, None).unwrap();
        engine.vacation().upsert_cashout_rule(&rule, None).unwrap();

        assert_eq!(store.record_count("cashout_rule"), 1);
        assert_eq!(engine.vacation().cashout_rule(2026).unwrap(), Some(rule));
    }

    #[test]
    fn test_cashout_rule_rejects_non_positive_hours_per_day() {
        let (store, engine) = engine();
        let rule = CashoutRule {
            year: 2026,
            cap_days: dec("3"),
            hours_per_day: Decimal::ZERO,
            amount_per_hour: dec("150"),
        };
        let result = engine.vacation().upsert_cashout_rule(&rule, None);
        assert!(matches!(result, Err(EngineError::InvalidRule { .. })));
        assert_eq!(store.record_count("cashout_rule"), 0);
    }

    #[test]
    fn test_year_end_cashout_uses_defaults_without_rule() {
        let (_store, engine) = engine();
        engine.vacation().ensure_year_record("A", 2026, dec("37")).unwrap();

        let cashout = engine.vacation().year_end_cashout("A", 2026).unwrap();
        assert!(cashout.rule_is_default);
        assert_eq!(cashout.rule.amount_per_hour, dec("125"));
        assert_eq!(cashout.result.remaining_days, dec("4.625"));
        assert_eq!(cashout.result.cashout_days, dec("4"));
        assert_eq!(cashout.result.cashout_amount, dec("4000"));
    }

    #[test]
    fn test_year_end_cashout_applies_stored_cap() {
        let (_store, engine) = engine();
        engine.vacation().ensure_year_record("A", 2026, dec("80")).unwrap();
        engine
            .vacation()
            .upsert_cashout_rule(
                &CashoutRule {
                    year: 2026,
                    cap_days: dec("3"),
                    hours_per_day: dec("8"),
                    amount_per_hour: dec("150"),
                },
                None,
            )
            .unwrap();

        let cashout = engine.vacation().year_end_cashout("A", 2026).unwrap();
        assert!(!cashout.rule_is_default);
        assert_eq!(cashout.result.cashout_days, dec("3"));
        assert_eq!(cashout.result.cashout_amount, dec("3600"));
    }

    #[test]
    fn test_year_end_cashout_survives_unavailable_rules() {
        let (store, engine) = engine();
        engine.vacation().ensure_year_record("A", 2026, dec("16")).unwrap();
        store.set_unavailable("cashout_rule");

        let cashout = engine.vacation().year_end_cashout("A", 2026).unwrap();
        assert!(cashout.rule_is_default);
        assert_eq!(cashout.result.cashout_amount, dec("2000"));
    }

    proptest! {
        #[test]
        fn test_recomputed_used_matches_approved_hours(hours in proptest::collection::vec(1i64..40, 0..6)) {
            let (store, engine) = engine();
            engine.vacation().ensure_year_record("P", 2026, dec("100")).unwrap();
            for (i, h) in hours.iter().enumerate() {
                leave_request(&store, "P", "特休", "通過", date(2026, 1, 1 + i as u32), *h);
            }
            let total: i64 = hours.iter().sum();
            let snapshot = engine.vacation().snapshot("P", 2026).unwrap();
            prop_assert_eq!(snapshot.used_hours, Decimal::from(total));
            prop_assert!(snapshot.remaining_hours >= Decimal::ZERO);
            prop_assert_eq!(snapshot.remaining_hours, (dec("100") - Decimal::from(total)).max(Decimal::ZERO));
        }
    }
}
