//! Weekday overtime accrual against the store.
//!
//! Stage A (counting) is pure and lives in [`crate::calculation`]. This
//! component reads the roster, persists one count per employee-month with a
//! keyed upsert, manages the monthly rule and turns both into pay.

use std::collections::HashSet;

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::{compute_weekday_appearances, overtime_amount};
use crate::config::Collection;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BatchOutcome, DutyCell, DutyRow, OvertimeCount, OvertimePay, OvertimeRule, Period, Provenance,
    parse_day_label,
};
use crate::schema::fields::{duty, overtime_count, overtime_rule};
use crate::schema::{FieldValue, Scalar};
use crate::store::{Filter, Properties};

use super::{Access, Engine, OperationOutcome, require_employee};

const COUNT_FIELDS: [&str; 4] = [
    overtime_count::EMPLOYEE,
    overtime_count::YEAR,
    overtime_count::MONTH,
    overtime_count::HOURS,
];

const RULE_FIELDS: [&str; 6] = [
    overtime_rule::NAME,
    overtime_rule::YEAR,
    overtime_rule::MONTH,
    overtime_rule::SHIFT_HOURS,
    overtime_rule::HOURLY_RATE,
    overtime_rule::NOTE,
];

const DUTY_META_FIELDS: [&str; 5] = [duty::YEAR, duty::MONTH, duty::DAY, duty::WEEKDAY, duty::NOTE];

/// Syncs roster counts and computes weekday overtime pay.
pub struct OvertimeAccrual<'a> {
    engine: &'a Engine,
}

fn count_key(access: &Access<'_>, employee: &str, period: Period) -> EngineResult<Filter> {
    Ok(Filter::And(vec![
        Filter::equals(&access.fields.require(overtime_count::EMPLOYEE)?.key, employee),
        Filter::equals(&access.fields.require(overtime_count::YEAR)?.key, period.year),
        Filter::equals(&access.fields.require(overtime_count::MONTH)?.key, period.month),
    ]))
}

/// Rules are keyed by year and month, or by the "YYYY-MM" title when the
/// collection has no year or month field.
fn rule_key(access: &Access<'_>, period: Period) -> EngineResult<Filter> {
    match (
        access.equals(overtime_rule::YEAR, period.year),
        access.equals(overtime_rule::MONTH, period.month),
    ) {
        (Some(year), Some(month)) => Ok(Filter::And(vec![year, month])),
        _ => access
            .equals(overtime_rule::NAME, period.to_string())
            .ok_or_else(|| EngineError::SchemaMismatch {
                collection: access.fields.collection().to_string(),
                field: overtime_rule::NAME.to_string(),
            }),
    }
}

fn duty_day(value: &Scalar) -> Option<u32> {
    match value {
        Scalar::Date(span) => Some(span.start.day()),
        other => other.as_text().and_then(|text| parse_day_label(&text)),
    }
}

fn duty_cell(value: &FieldValue) -> Option<DutyCell> {
    match value.decode() {
        Scalar::Text(text) => Some(DutyCell::Text(text)),
        Scalar::List(names) if !names.is_empty() => Some(DutyCell::Names(names)),
        _ => None,
    }
}

impl<'a> OvertimeAccrual<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    // ── Roster ───────────────────────────────────────────────

    /// Reads the roster rows of `period`, sorted by day.
    ///
    /// Rows are filtered on the year and month fields when the collection
    /// has them. The day comes from the digits of the day label; rows whose
    /// label has none sort last.
    pub fn load_duty_rows(&self, period: Period) -> EngineResult<Vec<DutyRow>> {
        let access = self.engine.open(Collection::Duty, &DUTY_META_FIELDS)?;
        let filter = Filter::all(
            [
                access.equals(duty::YEAR, period.year),
                access.equals(duty::MONTH, period.month),
            ]
            .into_iter()
            .flatten()
            .collect(),
        );
        let meta: HashSet<&str> = DUTY_META_FIELDS
            .iter()
            .filter_map(|logical| access.fields.key(logical))
            .collect();

        let mut rows: Vec<DutyRow> = access
            .find_all(filter)?
            .iter()
            .map(|record| DutyRow {
                day: duty_day(&access.fields.read(record, duty::DAY)),
                columns: record
                    .properties
                    .iter()
                    .filter(|(key, _)| !meta.contains(key.as_str()))
                    .filter_map(|(key, value)| Some((key.clone(), duty_cell(value)?)))
                    .collect(),
            })
            .collect();
        rows.sort_by_key(|row| (row.day.is_none(), row.day));
        Ok(rows)
    }

    // ── Counts ───────────────────────────────────────────────

    /// Counts weekday appearances in `rows` and upserts one count per
    /// employee for `period`.
    ///
    /// Each employee is written independently; a failure is recorded
    /// against that employee and the rest carry on. Running the same sync
    /// twice leaves exactly one count per employee.
    pub fn sync_counts(
        &self,
        period: Period,
        rows: &[DutyRow],
        actor: Option<&str>,
    ) -> BatchOutcome<String> {
        let counts = compute_weekday_appearances(period, rows);
        let mut outcome = BatchOutcome::new();

        match self.engine.open(Collection::OvertimeCount, &COUNT_FIELDS) {
            Ok(access) => {
                for (employee, appearances) in &counts {
                    let hours = Decimal::from(*appearances);
                    match self.upsert_count(&access, employee, period, hours) {
                        Ok(()) => outcome.succeed(employee.clone()),
                        Err(error) => {
                            warn!(
                                employee = %employee,
                                period = %period,
                                error = %error,
                                "Overtime count upsert failed"
                            );
                            outcome.fail(employee.clone(), error.to_string());
                        }
                    }
                }
                access.invalidate();
            }
            Err(error) => {
                warn!(period = %period, error = %error, "Overtime counts cannot be written");
                for employee in counts.keys() {
                    outcome.fail(employee.clone(), error.to_string());
                }
            }
        }

        let (succeeded, failed) = outcome.counts();
        info!(period = %period, succeeded, failed, "Overtime counts synced");
        self.engine.oplog().record(
            actor,
            "sync_overtime_counts",
            &format!("{period}: {succeeded} succeeded, {failed} failed"),
            if outcome.is_complete() {
                OperationOutcome::Success
            } else {
                OperationOutcome::Failure
            },
        );
        outcome
    }

    fn upsert_count(
        &self,
        access: &Access<'_>,
        employee: &str,
        period: Period,
        hours: Decimal,
    ) -> EngineResult<()> {
        let key = count_key(access, employee, period)?;
        access.fields.require(overtime_count::HOURS)?;

        let mut properties = Properties::new();
        access.fields.put_key(&mut properties, overtime_count::EMPLOYEE, employee)?;
        access.fields.put_key(&mut properties, overtime_count::YEAR, period.year)?;
        access.fields.put_key(&mut properties, overtime_count::MONTH, period.month)?;
        access.fields.put(&mut properties, overtime_count::HOURS, hours);
        access.upsert(key, properties)?;
        Ok(())
    }

    /// The stored count of `employee` for `period`, if any.
    pub fn count(&self, employee: &str, period: Period) -> EngineResult<Option<OvertimeCount>> {
        let employee = require_employee(employee)?;
        let access = self.engine.open(Collection::OvertimeCount, &COUNT_FIELDS)?;
        let record = access.find_first(count_key(&access, employee, period)?)?;
        Ok(record.map(|record| OvertimeCount {
            employee: employee.to_string(),
            period,
            hours: access
                .fields
                .read(&record, overtime_count::HOURS)
                .as_number()
                .unwrap_or(Decimal::ZERO),
        }))
    }

    // ── Rules ────────────────────────────────────────────────

    /// The overtime rule for `period`, if one is stored.
    pub fn rule(&self, period: Period) -> EngineResult<Option<OvertimeRule>> {
        let access = self.engine.open(Collection::OvertimeRule, &RULE_FIELDS)?;
        let record = access.find_first(rule_key(&access, period)?)?;
        Ok(record.map(|record| {
            let number = |logical: &str| {
                access
                    .fields
                    .read(&record, logical)
                    .as_number()
                    .unwrap_or(Decimal::ZERO)
            };
            OvertimeRule {
                period,
                shift_hours: number(overtime_rule::SHIFT_HOURS),
                hourly_rate: number(overtime_rule::HOURLY_RATE),
                note: access
                    .fields
                    .read(&record, overtime_rule::NOTE)
                    .as_text()
                    .unwrap_or_default(),
            }
        }))
    }

    /// Creates or replaces the overtime rule for `rule.period`.
    ///
    /// # Errors
    ///
    /// - `InvalidRule` when shift hours or the hourly rate is negative;
    ///   nothing is written
    /// - `SchemaMismatch` when the rule cannot be keyed
    /// - `Store` when the write fails
    pub fn upsert_rule(&self, rule: &OvertimeRule, actor: Option<&str>) -> EngineResult<OvertimeRule> {
        let result = self.write_rule(rule);
        let (outcome, content) = match &result {
            Ok(()) => (
                OperationOutcome::Success,
                format!("{}: rate {}, shift hours {}", rule.period, rule.hourly_rate, rule.shift_hours),
            ),
            Err(error) if error.is_degradable() => (OperationOutcome::SystemError, error.to_string()),
            Err(error) => (OperationOutcome::Failure, error.to_string()),
        };
        self.engine
            .oplog()
            .record(actor, "upsert_overtime_rule", &content, outcome);
        result.map(|()| rule.clone())
    }

    fn write_rule(&self, rule: &OvertimeRule) -> EngineResult<()> {
        if rule.shift_hours < Decimal::ZERO || rule.hourly_rate < Decimal::ZERO {
            return Err(EngineError::InvalidRule {
                message: format!(
                    "shift hours ({}) and hourly rate ({}) must not be negative",
                    rule.shift_hours, rule.hourly_rate
                ),
            });
        }
        let access = self.engine.open(Collection::OvertimeRule, &RULE_FIELDS)?;
        let key = rule_key(&access, rule.period)?;

        let mut properties = Properties::new();
        if access.fields.contains(overtime_rule::YEAR) && access.fields.contains(overtime_rule::MONTH) {
            access.fields.put_key(&mut properties, overtime_rule::YEAR, rule.period.year)?;
            access.fields.put_key(&mut properties, overtime_rule::MONTH, rule.period.month)?;
            access.fields.put(&mut properties, overtime_rule::NAME, rule.period.to_string());
        } else {
            access.fields.put_key(&mut properties, overtime_rule::NAME, rule.period.to_string())?;
        }
        access.fields.put(&mut properties, overtime_rule::SHIFT_HOURS, rule.shift_hours);
        access.fields.put(&mut properties, overtime_rule::HOURLY_RATE, rule.hourly_rate);
        access.fields.put(&mut properties, overtime_rule::NOTE, rule.note.as_str());

        let upserted = access.upsert(key, properties);
        access.invalidate();
        upserted?;
        info!(period = %rule.period, hourly_rate = %rule.hourly_rate, "Overtime rule saved");
        Ok(())
    }

    // ── Pay ──────────────────────────────────────────────────

    /// Weekday overtime pay of `employee` for `period`.
    ///
    /// Never fails. A missing rule, a non-positive rate, a missing count or
    /// an unreadable store all give a zero amount flagged as degraded.
    pub fn weekday_pay(&self, employee: &str, period: Period) -> OvertimePay {
        match self.try_weekday_pay(employee, period) {
            Ok(pay) => {
                if let Provenance::Degraded { reason } = &pay.provenance {
                    warn!(employee = %employee, period = %period, reason = %reason, "Overtime pay degraded");
                }
                pay
            }
            Err(error) => {
                warn!(
                    employee = %employee,
                    period = %period,
                    error = %error,
                    "Overtime pay degraded to zero"
                );
                OvertimePay::degraded(employee, period, error.to_string())
            }
        }
    }

    fn try_weekday_pay(&self, employee: &str, period: Period) -> EngineResult<OvertimePay> {
        let employee = require_employee(employee)?;
        let Some(rule) = self.rule(period)? else {
            return Ok(OvertimePay::degraded(
                employee,
                period,
                format!("no overtime rule for {period}"),
            ));
        };
        if rule.hourly_rate <= Decimal::ZERO {
            return Ok(OvertimePay {
                rule: Some(rule),
                ..OvertimePay::degraded(employee, period, "hourly rate is not positive")
            });
        }
        let Some(count) = self.count(employee, period)? else {
            return Ok(OvertimePay {
                rule: Some(rule),
                ..OvertimePay::degraded(employee, period, format!("no overtime count for {period}"))
            });
        };

        Ok(OvertimePay {
            employee: employee.to_string(),
            period,
            hours: count.hours,
            amount: overtime_amount(count.hours, rule.hourly_rate),
            rule: Some(rule),
            provenance: Provenance::Computed,
        })
    }
}
