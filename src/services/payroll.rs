//! Payroll records: read, draft with suggestions, and save.
//!
//! Pay-item fields are the most hand-edited part of any payroll collection,
//! so they are resolved with prefix matching as a last resort. The key
//! fields (employee, year, month) must resolve or nothing is written.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::{compute_totals, merge};
use crate::config::Collection;
use crate::error::EngineResult;
use crate::models::{
    PayItem, PayTotals, PayrollDraft, PayrollInput, PayrollRecord, Period, Provenance, Suggestion,
};
use crate::schema::fields::payroll;
use crate::store::{Filter, Properties, Record};

use super::{Access, Engine, OperationOutcome, require_employee};

fn payroll_fields() -> Vec<&'static str> {
    let mut fields = vec![
        payroll::EMPLOYEE,
        payroll::YEAR,
        payroll::MONTH,
        payroll::GROSS_TOTAL,
        payroll::DEDUCT_TOTAL,
        payroll::NET_PAY,
        payroll::NOTE,
    ];
    fields.extend(PayItem::labels());
    fields
}

fn period_filters(access: &Access<'_>, period: Period) -> EngineResult<Vec<Filter>> {
    Ok(vec![
        Filter::equals(&access.fields.require(payroll::YEAR)?.key, period.year),
        Filter::equals(&access.fields.require(payroll::MONTH)?.key, period.month),
    ])
}

fn record_key(access: &Access<'_>, employee: &str, period: Period) -> EngineResult<Filter> {
    let mut filters = vec![Filter::equals(
        &access.fields.require(payroll::EMPLOYEE)?.key,
        employee,
    )];
    filters.extend(period_filters(access, period)?);
    Ok(Filter::And(filters))
}

fn read_record(access: &Access<'_>, record: &Record, employee: &str, period: Period) -> PayrollRecord {
    let number = |logical: &str| access.fields.read(record, logical).as_number();
    PayrollRecord {
        id: record.id,
        employee: employee.to_string(),
        period,
        items: PayItem::ALL
            .iter()
            .filter_map(|item| Some((*item, number(item.label())?)))
            .collect(),
        gross_total: number(payroll::GROSS_TOTAL),
        deduct_total: number(payroll::DEDUCT_TOTAL),
        net_pay: number(payroll::NET_PAY),
        note: access
            .fields
            .read(record, payroll::NOTE)
            .as_text()
            .unwrap_or_default(),
    }
}

/// Reads, drafts and saves monthly payroll records.
pub struct PayrollAggregator<'a> {
    engine: &'a Engine,
}

impl<'a> PayrollAggregator<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn open(&self) -> EngineResult<Access<'a>> {
        self.engine
            .open_with_prefix(Collection::Payroll, &payroll_fields())
    }

    /// The payroll record of `employee` for `period`, if one is stored.
    ///
    /// An item whose field is empty (never written or cleared) is absent
    /// from [`PayrollRecord::items`].
    pub fn get_record(&self, employee: &str, period: Period) -> EngineResult<Option<PayrollRecord>> {
        let employee = require_employee(employee)?;
        let access = self.open()?;
        let record = access.find_first(record_key(&access, employee, period)?)?;
        Ok(record.map(|record| read_record(&access, &record, employee, period)))
    }

    /// Every payroll record of `period`, ordered by employee.
    pub fn list_records(&self, period: Period) -> EngineResult<Vec<PayrollRecord>> {
        let access = self.open()?;
        access.fields.require(payroll::EMPLOYEE)?;
        let filter = Filter::And(period_filters(&access, period)?);

        let mut records: Vec<PayrollRecord> = access
            .find_all(Some(filter))?
            .iter()
            .map(|record| {
                let employee = access
                    .fields
                    .read(record, payroll::EMPLOYEE)
                    .as_text()
                    .unwrap_or_default();
                read_record(&access, record, &employee, period)
            })
            .collect();
        records.sort_by(|a, b| a.employee.cmp(&b.employee));
        Ok(records)
    }

    /// Saves the payroll of `employee` for `period`.
    ///
    /// Absent items are written as zero. Totals the input does not supply
    /// are computed from the items. The existing record for the key is
    /// updated, otherwise one is created.
    ///
    /// # Errors
    ///
    /// - `MissingField` when `employee` is blank
    /// - `SchemaMismatch` when the employee, year or month field cannot be
    ///   resolved
    /// - `ConfigurationMissing` or `Store` when the collection cannot be
    ///   written
    ///
    /// Nothing is written when any of these occur.
    pub fn upsert(
        &self,
        employee: &str,
        period: Period,
        input: &PayrollInput,
        actor: Option<&str>,
    ) -> EngineResult<PayrollRecord> {
        let result = self.write(employee, period, input);
        let (outcome, content) = match &result {
            Ok(record) => (
                OperationOutcome::Success,
                format!("{} {}: net pay {}", record.employee, period, record.net_pay.unwrap_or_default()),
            ),
            Err(error) if error.is_degradable() => (
                OperationOutcome::SystemError,
                format!("{} {}: {}", employee.trim(), period, error),
            ),
            Err(error) => (
                OperationOutcome::Failure,
                format!("{} {}: {}", employee.trim(), period, error),
            ),
        };
        if let Err(error) = &result {
            warn!(employee = %employee, period = %period, error = %error, "Payroll save failed");
        }
        self.engine
            .oplog()
            .record(actor, "save_payroll", &content, outcome);
        result
    }

    fn write(&self, employee: &str, period: Period, input: &PayrollInput) -> EngineResult<PayrollRecord> {
        let employee = require_employee(employee)?;
        let access = self.open()?;
        let key = record_key(&access, employee, period)?;
        let totals = compute_totals(input);

        let mut properties = Properties::new();
        access.fields.put_key(&mut properties, payroll::EMPLOYEE, employee)?;
        access.fields.put_key(&mut properties, payroll::YEAR, period.year)?;
        access.fields.put_key(&mut properties, payroll::MONTH, period.month)?;
        for item in PayItem::ALL {
            access.fields.put(&mut properties, item.label(), input.amount(item));
        }
        access.fields.put(&mut properties, payroll::GROSS_TOTAL, totals.gross_total);
        access.fields.put(&mut properties, payroll::DEDUCT_TOTAL, totals.deduct_total);
        access.fields.put(&mut properties, payroll::NET_PAY, totals.net_pay);
        access.fields.put(&mut properties, payroll::NOTE, input.note.as_str());

        let upserted = access.upsert(key, properties);
        access.invalidate();
        let id = upserted?.id();

        info!(
            employee = %employee,
            period = %period,
            gross_total = %totals.gross_total,
            net_pay = %totals.net_pay,
            "Payroll saved"
        );
        Ok(PayrollRecord {
            id,
            employee: employee.to_string(),
            period,
            items: PayItem::ALL
                .iter()
                .map(|item| (*item, input.amount(*item)))
                .collect(),
            gross_total: Some(totals.gross_total),
            deduct_total: Some(totals.deduct_total),
            net_pay: Some(totals.net_pay),
            note: input.note.clone(),
        })
    }

    /// Builds the payroll form of `employee` for `period`.
    ///
    /// Items come from the stored record, or zero. Weekday overtime pay and
    /// the meal allowance are suggested from the overtime and lunch
    /// calculators, but a suggestion only fills an item the record does not
    /// already hold; a stored value, including zero, is never replaced.
    pub fn prepare_draft(&self, employee: &str, period: Period) -> EngineResult<PayrollDraft> {
        let employee = require_employee(employee)?;
        let existing = self.get_record(employee, period)?;

        let overtime = self.engine.overtime().weekday_pay(employee, period);
        let lunch = self.engine.lunch().settle(employee, period);
        let suggested: [(PayItem, Decimal, Provenance); 2] = [
            (PayItem::WeekdayOvertimePay, overtime.amount, overtime.provenance),
            (PayItem::MealAllowance, lunch.difference, lunch.provenance),
        ];

        let stored = |item: PayItem| existing.as_ref().and_then(|record| record.item(item));
        let mut items: BTreeMap<PayItem, Decimal> = PayItem::ALL
            .iter()
            .map(|item| (*item, stored(*item).unwrap_or(Decimal::ZERO)))
            .collect();

        let suggestions: Vec<Suggestion> = suggested
            .into_iter()
            .map(|(item, value, provenance)| {
                let current = stored(item);
                items.insert(item, merge(current, value));
                Suggestion {
                    item,
                    suggested: value,
                    stored: current,
                    applied: current.is_none(),
                    provenance,
                }
            })
            .collect();

        let totals: PayTotals = compute_totals(&PayrollInput {
            items: items.clone(),
            ..PayrollInput::default()
        });
        info!(
            employee = %employee,
            period = %period,
            suggestions_applied = suggestions.iter().filter(|s| s.applied).count(),
            "Payroll draft prepared"
        );

        Ok(PayrollDraft {
            employee: employee.to_string(),
            period,
            record_id: existing.as_ref().map(|record| record.id),
            items,
            totals,
            note: existing.map(|record| record.note).unwrap_or_default(),
            suggestions,
        })
    }
}
