//! Meal subsidy settlement against stored attendance and lunch orders.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::settle_lunch;
use crate::config::Collection;
use crate::error::EngineResult;
use crate::models::{LunchOrder, LunchSettlement, Period};
use crate::schema::fields::lunch;
use crate::store::Filter;

use super::{Engine, require_employee};

/// Settles the monthly meal subsidy.
pub struct LunchCalculator<'a> {
    engine: &'a Engine,
}

impl<'a> LunchCalculator<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Lunch orders of `employee` dated inside `period`.
    ///
    /// Orders without a date are skipped; orders without an amount count
    /// as zero.
    pub fn orders(&self, employee: &str, period: Period) -> EngineResult<Vec<LunchOrder>> {
        let access = self
            .engine
            .open(Collection::Lunch, &[lunch::EMPLOYEE, lunch::DATE, lunch::AMOUNT])?;
        let date_key = access.fields.require(lunch::DATE)?.key.clone();

        let filter = Filter::And(vec![
            access.fields.naming(lunch::EMPLOYEE, employee)?,
            Filter::date_range(&date_key, period.start(), period.end_exclusive()),
        ]);

        Ok(access
            .find_all(Some(filter))?
            .iter()
            .filter_map(|record| {
                let date = access.fields.read(record, lunch::DATE).as_date()?.start;
                let amount = access
                    .fields
                    .read(record, lunch::AMOUNT)
                    .as_number()
                    .unwrap_or(Decimal::ZERO);
                Some(LunchOrder {
                    employee: employee.trim().to_string(),
                    date,
                    amount,
                })
            })
            .collect())
    }

    /// Settles the meal subsidy for `employee` in `period`.
    ///
    /// Never fails: when attendance or orders cannot be read the result is
    /// a zero settlement flagged as degraded, with the reason.
    pub fn settle(&self, employee: &str, period: Period) -> LunchSettlement {
        match self.try_settle(employee, period) {
            Ok(settlement) => {
                info!(
                    employee = %employee,
                    period = %period,
                    eligible_days = settlement.eligible_days,
                    difference = %settlement.difference,
                    "Lunch settled"
                );
                settlement
            }
            Err(error) => {
                warn!(
                    employee = %employee,
                    period = %period,
                    error = %error,
                    "Lunch settlement degraded to zero"
                );
                LunchSettlement::degraded(employee, period, error.to_string())
            }
        }
    }

    fn try_settle(&self, employee: &str, period: Period) -> EngineResult<LunchSettlement> {
        let employee = require_employee(employee)?;
        let records = self.engine.attendance().records(employee, period)?;
        let orders = self.orders(employee, period)?;
        Ok(settle_lunch(
            employee,
            period,
            &records,
            &orders,
            self.engine.config().lunch.per_diem,
        ))
    }
}
